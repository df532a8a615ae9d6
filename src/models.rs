// ==============================================================================
// models.rs - Staging Data Models
// ==============================================================================
// Description: Canonical records handed to the prevalence estimator model and
//              the attachment descriptors reported back to the warehouse
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::output::TableRow;

/// Loosely-structured record as exported by the warehouse (one NDJSON line)
pub type Record = Map<String, Value>;

/// Canonical sample row (one diagnostic test submission)
///
/// Every field is nullable. `None` is the null representation; explicit JSON
/// nulls from the warehouse are folded into `None` on the way in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub id: Option<Value>,
    pub sub_administrative_area_id: Option<Value>,
    pub species: Option<Value>,
    pub age_group: Option<Value>,
    pub sex: Option<Value>,
    pub sample_source: Option<Value>,
    pub result: Option<Value>,
}

impl Sample {
    /// Column order of sample.csv
    pub const COLUMNS: [&'static str; 7] = [
        "id",
        "sub_administrative_area_id",
        "species",
        "age_group",
        "sex",
        "sample_source",
        "result",
    ];
}

impl TableRow for Sample {
    fn cell(&self, column: &str) -> Option<&Value> {
        match column {
            "id" => self.id.as_ref(),
            "sub_administrative_area_id" => self.sub_administrative_area_id.as_ref(),
            "species" => self.species.as_ref(),
            "age_group" => self.age_group.as_ref(),
            "sex" => self.sex.as_ref(),
            "sample_source" => self.sample_source.as_ref(),
            "result" => self.result.as_ref(),
            _ => None,
        }
    }
}

/// Canonical sub-administrative area row (geographic subdivision)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubAdministrativeArea {
    pub id: Option<Value>,
    pub full_name: Option<Value>,
}

impl SubAdministrativeArea {
    /// Column order of sub_administrative_area.csv
    pub const COLUMNS: [&'static str; 2] = ["id", "full_name"];
}

impl TableRow for SubAdministrativeArea {
    fn cell(&self, column: &str) -> Option<&Value> {
        match column {
            "id" => self.id.as_ref(),
            "full_name" => self.full_name.as_ref(),
            _ => None,
        }
    }
}

/// Model run parameters with the provider already stripped
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    /// Remaining parameters, in document order
    pub values: Map<String, Value>,

    /// Administrative area of the requesting provider (reporting only)
    pub provider_area: Value,
}

impl ParameterSet {
    /// Column names of params.csv (document key order)
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

impl TableRow for Map<String, Value> {
    fn cell(&self, column: &str) -> Option<&Value> {
        self.get(column)
    }
}

/// How the warehouse presents an attachment to its users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentRole {
    /// Offered as a file download
    Downloadable,
    /// Rendered inline as model feedback
    Feedback,
}

/// Entry of attachments.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub role: AttachmentRole,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        role: AttachmentRole,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            role,
        }
    }
}
