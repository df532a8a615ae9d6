// ==============================================================================
// config.rs - Data Directory Layout
// ==============================================================================
// Description: File names and paths exchanged with the data warehouse and the
//              prevalence estimator model
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default data directory mounted into the model container
#[cfg(windows)]
pub const DEFAULT_DATA_DIR: &str = "data";
#[cfg(not(windows))]
pub const DEFAULT_DATA_DIR: &str = "/data";

pub const PARAMS_FILE: &str = "params.json";
pub const SAMPLES_FILE: &str = "sample.ndJson";
pub const SUB_AREAS_FILE: &str = "sub_administrative_area.ndJson";

pub const PARAMS_CSV: &str = "params.csv";
pub const SAMPLES_CSV: &str = "sample.csv";
pub const SUB_AREAS_CSV: &str = "sub_administrative_area.csv";

/// Matrix written by the external model
pub const MODEL_OUTPUT_CSV: &str = "SpeedGoatOutputMatrix.csv";
pub const WORKBOOK_FILE: &str = "PrevalenceEstimatorData.xlsx";

pub const ATTACHMENTS_DIR: &str = "attachments";
pub const ATTACHMENTS_MANIFEST: &str = "attachments.json";
pub const NARRATIVE_FILE: &str = "info.html";
pub const EXECUTION_LOG_FILE: &str = "execution_log.log";

/// Resolved paths for one staging run
#[derive(Debug, Clone)]
pub struct StagingPaths {
    data_dir: PathBuf,
}

impl StagingPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the attachments directory (and the data directory) if missing
    pub fn ensure_layout(&self) -> Result<()> {
        std::fs::create_dir_all(self.attachments_dir()).with_context(|| {
            format!(
                "Failed to create attachments directory {:?}",
                self.attachments_dir()
            )
        })
    }

    pub fn params(&self) -> PathBuf {
        self.data_dir.join(PARAMS_FILE)
    }

    pub fn samples(&self) -> PathBuf {
        self.data_dir.join(SAMPLES_FILE)
    }

    pub fn sub_areas(&self) -> PathBuf {
        self.data_dir.join(SUB_AREAS_FILE)
    }

    pub fn params_csv(&self) -> PathBuf {
        self.data_dir.join(PARAMS_CSV)
    }

    pub fn samples_csv(&self) -> PathBuf {
        self.data_dir.join(SAMPLES_CSV)
    }

    pub fn sub_areas_csv(&self) -> PathBuf {
        self.data_dir.join(SUB_AREAS_CSV)
    }

    pub fn model_output(&self) -> PathBuf {
        self.data_dir.join(MODEL_OUTPUT_CSV)
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.data_dir.join(ATTACHMENTS_DIR)
    }

    pub fn workbook(&self) -> PathBuf {
        self.attachments_dir().join(WORKBOOK_FILE)
    }

    pub fn narrative(&self) -> PathBuf {
        self.attachments_dir().join(NARRATIVE_FILE)
    }

    pub fn execution_log(&self) -> PathBuf {
        self.attachments_dir().join(EXECUTION_LOG_FILE)
    }

    pub fn manifest(&self) -> PathBuf {
        self.data_dir.join(ATTACHMENTS_MANIFEST)
    }
}
