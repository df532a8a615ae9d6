// ==============================================================================
// ndjson.rs - Warehouse NDJSON Export Parser
// ==============================================================================
// Description: Parser for line-delimited JSON record exports (samples and
//              sub-administrative areas)
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Format: One JSON object per line, blank lines ignored
// Example:
//   {"_id": "s1", "species": "white-tailed deer", "tests": [...]}
//   {"_id": "s2", "_sub_administrative_area": {"_id": "a7"}}
// ==============================================================================

use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::models::Record;

/// Errors that can occur during NDJSON parsing
#[derive(Error, Debug)]
pub enum NdjsonParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON at line {line}: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line} is not a JSON object")]
    NotAnObject { line: usize },
}

/// Parser for warehouse NDJSON exports
pub struct NdjsonParser;

impl NdjsonParser {
    /// Parse every record of an NDJSON file
    ///
    /// An empty file yields an empty batch. Any line that is not a JSON
    /// object fails the whole file, since a partial batch would silently
    /// skew the model.
    pub fn parse(path: impl AsRef<Path>) -> Result<Vec<Record>, NdjsonParseError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line_result?;

            if line.trim().is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(&line).map_err(|source| {
                NdjsonParseError::InvalidJson {
                    line: line_number,
                    source,
                }
            })?;

            match value {
                Value::Object(record) => records.push(record),
                _ => return Err(NdjsonParseError::NotAnObject { line: line_number }),
            }
        }

        Ok(records)
    }
}
