// ==============================================================================
// params.rs - Model Parameter Document Parser
// ==============================================================================
// Description: Parser for the warehouse params.json document
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Format: Single JSON object, one nested provider entry
// Example:
//   {
//     "_provider": {"_administrative_area": {"administrative_area": "Wisconsin"}},
//     "prevalence_threshold": 0.01,
//     "season_year": 2024
//   }
// ==============================================================================

use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

use crate::models::ParameterSet;

/// Key of the nested provider entry
pub const PROVIDER_KEY: &str = "_provider";

/// Errors that can occur while loading params.json
#[derive(Error, Debug)]
pub enum ParamsParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parameters document is not a JSON object")]
    NotAnObject,

    #[error("Parameters document has no provider administrative area")]
    MissingProvider,
}

/// Parser for the model parameter document
pub struct ParamsParser;

impl ParamsParser {
    /// Load params.json, strip the provider and return the remaining parameters
    ///
    /// The provider is request metadata rather than a model parameter, so it
    /// never reaches params.csv. Its administrative area is kept on the
    /// returned [`ParameterSet`] for the run report.
    pub fn parse(path: impl AsRef<Path>) -> Result<ParameterSet, ParamsParseError> {
        let file = File::open(path.as_ref())?;
        let document: Value = serde_json::from_reader(BufReader::new(file))?;

        match document {
            Value::Object(values) => Self::strip_provider(values),
            _ => Err(ParamsParseError::NotAnObject),
        }
    }

    fn strip_provider(mut values: Map<String, Value>) -> Result<ParameterSet, ParamsParseError> {
        let provider = values
            .shift_remove(PROVIDER_KEY)
            .ok_or(ParamsParseError::MissingProvider)?;

        let provider_area = provider
            .get("_administrative_area")
            .and_then(|area| area.get("administrative_area"))
            .cloned()
            .ok_or(ParamsParseError::MissingProvider)?;

        Ok(ParameterSet {
            values,
            provider_area,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_strips_provider() {
        let file = create_test_file(
            r#"{
                "season_year": 2024,
                "_provider": {"_administrative_area": {"administrative_area": "Wisconsin"}},
                "prevalence_threshold": 0.01
            }"#,
        );

        let params = ParamsParser::parse(file.path()).unwrap();

        assert_eq!(params.provider_area, json!("Wisconsin"));
        assert!(!params.values.contains_key(PROVIDER_KEY));
        assert_eq!(params.columns(), vec!["season_year", "prevalence_threshold"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = ParamsParser::parse(dir.path().join("params.json"));
        assert!(matches!(result, Err(ParamsParseError::IoError(_))));
    }

    #[test]
    fn test_invalid_json() {
        let file = create_test_file("{\"season_year\": ");

        let result = ParamsParser::parse(file.path());
        assert!(matches!(result, Err(ParamsParseError::JsonError(_))));
    }

    #[test]
    fn test_not_an_object() {
        let file = create_test_file("[1, 2, 3]");

        let result = ParamsParser::parse(file.path());
        assert!(matches!(result, Err(ParamsParseError::NotAnObject)));
    }

    #[test]
    fn test_missing_provider() {
        let file = create_test_file(r#"{"season_year": 2024}"#);
        let result = ParamsParser::parse(file.path());
        assert!(matches!(result, Err(ParamsParseError::MissingProvider)));

        let file = create_test_file(r#"{"_provider": {"name": "DNR"}}"#);
        let result = ParamsParser::parse(file.path());
        assert!(matches!(result, Err(ParamsParseError::MissingProvider)));
    }
}
