// ==============================================================================
// error.rs - Staging Error Taxonomy
// ==============================================================================
// Description: Fatal missing-input error shared by both staging pipelines
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Exit status when a mandatory input is absent or unparseable
pub const EXIT_MISSING_INPUT: u8 = 1;

/// Exit status for any other failure caught at the top level
pub const EXIT_FAILURE: u8 = 2;

/// A mandatory input file could not be located, read or parsed
///
/// Always fatal: the model cannot produce meaningful output from partial
/// warehouse data, so the pipeline halts without writing its outputs.
#[derive(Error, Debug)]
#[error("{input} ({path:?}) not found or could not be parsed: {reason}")]
pub struct MissingInput {
    /// Human-readable name of the input (e.g. "Samples (sample.ndJson)")
    pub input: String,
    pub path: PathBuf,
    pub reason: String,
}

impl MissingInput {
    pub fn new(input: impl Into<String>, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            input: input.into(),
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Map a pipeline failure to the process exit status
pub fn exit_status(error: &anyhow::Error) -> u8 {
    if error.downcast_ref::<MissingInput>().is_some() {
        EXIT_MISSING_INPUT
    } else {
        EXIT_FAILURE
    }
}
