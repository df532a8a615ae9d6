// ==============================================================================
// model_output.rs - Prevalence Estimator Output Matrix Parser
// ==============================================================================
// Description: Reader for the CSV matrix produced by the external model
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Format: Rectangular CSV with header, arbitrary columns
// Example:
//   "sub_administrative_area","n_samples","n_positive","prevalence"
//   "Dane",143,2,0.0139
//   "Iowa",87,0,NA
// ==============================================================================

use csv::ReaderBuilder;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading the model output matrix
#[derive(Error, Debug)]
pub enum ModelOutputParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("File is empty or has no header row")]
    EmptyFile,
}

/// Model output matrix, kept as raw text exactly as the model wrote it
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ModelOutputTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Parser for the model output matrix
pub struct ModelOutputParser;

impl ModelOutputParser {
    /// Read the whole matrix
    ///
    /// Rows whose length differs from the header are rejected by the CSV
    /// reader (`flexible(false)`), so a successful parse is always
    /// rectangular.
    pub fn parse(path: impl AsRef<Path>) -> Result<ModelOutputTable, ModelOutputParseError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(path.as_ref())?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ModelOutputParseError::EmptyFile);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(ModelOutputTable { headers, rows })
    }
}
