// ==============================================================================
// normalizer.rs - Warehouse Record Normalization
// ==============================================================================
// Description: Converts loosely-structured warehouse records into the fixed
//              sample and sub-administrative area schemas used by the model
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Algorithm (samples, per record, no cross-record state):
//   1. Canonical fields absent from the record become null
//   2. `_id` present                                   → id
//   3. `_sub_administrative_area` object with `_id`    → sub_administrative_area_id
//   4. `tests` filtered to selected_definitive == true (or numeric 1):
//        exactly one → its `result` (null if absent)
//        none / several / no tests → null
// ==============================================================================

use serde_json::Value;

use crate::models::{Record, Sample, SubAdministrativeArea};

/// Outcome of the "pick one result from many tests" rule
#[derive(Debug, Clone, PartialEq)]
pub enum ResultResolution {
    /// Exactly one test flagged selected_definitive
    Definitive(Option<Value>),
    /// Tests present but none flagged selected_definitive
    NoDefinitive,
    /// More than one test flagged selected_definitive (count)
    Ambiguous(usize),
    /// No `tests` field, a non-sequence `tests`, or an empty sequence
    NoTests,
}

impl ResultResolution {
    /// Value written to the `result` column. Only a single definitive test
    /// produces a value; the model is never handed a guess.
    pub fn into_result(self) -> Option<Value> {
        match self {
            ResultResolution::Definitive(result) => result,
            _ => None,
        }
    }
}

/// Tally of result resolutions across a batch of samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub definitive: usize,
    pub no_definitive: usize,
    pub ambiguous: usize,
    pub no_tests: usize,
}

impl ResolutionSummary {
    fn record(&mut self, resolution: &ResultResolution) {
        match resolution {
            ResultResolution::Definitive(_) => self.definitive += 1,
            ResultResolution::NoDefinitive => self.no_definitive += 1,
            ResultResolution::Ambiguous(_) => self.ambiguous += 1,
            ResultResolution::NoTests => self.no_tests += 1,
        }
    }
}

/// Apply the result resolution rule to a raw sample record
pub fn resolve_result(record: &Record) -> ResultResolution {
    let tests = match record.get("tests") {
        Some(Value::Array(tests)) if !tests.is_empty() => tests,
        _ => return ResultResolution::NoTests,
    };

    let definitive: Vec<&Value> = tests
        .iter()
        .filter(|test| test.get("selected_definitive").is_some_and(is_definitive_flag))
        .collect();

    match definitive.as_slice() {
        [] => ResultResolution::NoDefinitive,
        [test] => ResultResolution::Definitive(nullable(test.get("result"))),
        several => ResultResolution::Ambiguous(several.len()),
    }
}

/// Warehouse exports encode the flag as `true` or as the number 1
fn is_definitive_flag(flag: &Value) -> bool {
    match flag {
        Value::Bool(selected) => *selected,
        Value::Number(number) => number.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Normalize one raw sample record
pub fn normalize_sample(record: &Record) -> Sample {
    normalize_sample_with_resolution(record).0
}

/// Normalize a batch of raw sample records, keeping input order
pub fn normalize_samples(records: &[Record]) -> (Vec<Sample>, ResolutionSummary) {
    let mut summary = ResolutionSummary::default();

    let samples = records
        .iter()
        .map(|record| {
            let (sample, resolution) = normalize_sample_with_resolution(record);
            summary.record(&resolution);
            sample
        })
        .collect();

    (samples, summary)
}

fn normalize_sample_with_resolution(record: &Record) -> (Sample, ResultResolution) {
    let id = match record.get("_id") {
        Some(warehouse_id) => nullable(Some(warehouse_id)),
        None => nullable(record.get("id")),
    };

    let sub_administrative_area_id = match record
        .get("_sub_administrative_area")
        .and_then(Value::as_object)
        .and_then(|area| area.get("_id"))
    {
        Some(area_id) => nullable(Some(area_id)),
        None => nullable(record.get("sub_administrative_area_id")),
    };

    let resolution = resolve_result(record);

    let sample = Sample {
        id,
        sub_administrative_area_id,
        species: nullable(record.get("species")),
        age_group: nullable(record.get("age_group")),
        sex: nullable(record.get("sex")),
        sample_source: nullable(record.get("sample_source")),
        result: resolution.clone().into_result(),
    };

    (sample, resolution)
}

/// Normalize one raw sub-administrative area record
pub fn normalize_sub_area(record: &Record) -> SubAdministrativeArea {
    let id = match record.get("_id") {
        Some(warehouse_id) => nullable(Some(warehouse_id)),
        None => nullable(record.get("id")),
    };

    SubAdministrativeArea {
        id,
        full_name: nullable(record.get("full_name")),
    }
}

/// Normalize a batch of raw sub-administrative area records
pub fn normalize_sub_areas(records: &[Record]) -> Vec<SubAdministrativeArea> {
    records.iter().map(normalize_sub_area).collect()
}

/// Absent and explicit JSON null both map to `None`
fn nullable(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object fixture, got {}", other),
        }
    }

    #[test]
    fn test_single_definitive_test() {
        let raw = record(json!({
            "_id": "s1",
            "tests": [
                {"selected_definitive": true, "result": "positive"},
                {"selected_definitive": false, "result": "negative"}
            ]
        }));

        let sample = normalize_sample(&raw);

        assert_eq!(sample.id, Some(json!("s1")));
        assert_eq!(sample.result, Some(json!("positive")));
        assert_eq!(sample.sub_administrative_area_id, None);
        assert_eq!(sample.species, None);
        assert_eq!(sample.age_group, None);
        assert_eq!(sample.sex, None);
        assert_eq!(sample.sample_source, None);
    }

    #[test]
    fn test_ambiguous_definitive_tests() {
        let raw = record(json!({
            "_id": "s2",
            "tests": [
                {"selected_definitive": true, "result": "A"},
                {"selected_definitive": true, "result": "B"}
            ]
        }));

        assert_eq!(resolve_result(&raw), ResultResolution::Ambiguous(2));

        let sample = normalize_sample(&raw);
        assert_eq!(sample.id, Some(json!("s2")));
        assert_eq!(sample.result, None);
    }

    #[test]
    fn test_no_definitive_test() {
        let raw = record(json!({
            "tests": [
                {"selected_definitive": false, "result": "A"},
                {"result": "B"}
            ]
        }));

        assert_eq!(resolve_result(&raw), ResultResolution::NoDefinitive);
        assert_eq!(normalize_sample(&raw).result, None);
    }

    #[test]
    fn test_definitive_test_without_result() {
        let raw = record(json!({
            "result": "stale top-level value",
            "tests": [{"selected_definitive": true}]
        }));

        assert_eq!(resolve_result(&raw), ResultResolution::Definitive(None));
        assert_eq!(normalize_sample(&raw).result, None);
    }

    #[test]
    fn test_missing_or_empty_tests() {
        let no_tests = record(json!({"_id": "s3", "result": "positive"}));
        assert_eq!(resolve_result(&no_tests), ResultResolution::NoTests);
        assert_eq!(normalize_sample(&no_tests).result, None);

        let empty = record(json!({"tests": []}));
        assert_eq!(resolve_result(&empty), ResultResolution::NoTests);

        let null_tests = record(json!({"tests": null}));
        assert_eq!(resolve_result(&null_tests), ResultResolution::NoTests);
    }

    #[test]
    fn test_selected_definitive_flag_encodings() {
        let numeric = record(json!({
            "_id": "s4",
            "tests": [
                {"selected_definitive": 1, "result": "positive"},
                {"selected_definitive": false, "result": "negative"}
            ]
        }));
        let sample = normalize_sample(&numeric);
        assert_eq!(sample.id, Some(json!("s4")));
        assert_eq!(sample.result, Some(json!("positive")));

        let float = record(json!({"tests": [{"selected_definitive": 1.0, "result": "A"}]}));
        assert_eq!(
            resolve_result(&float),
            ResultResolution::Definitive(Some(json!("A")))
        );

        let mixed = record(json!({
            "tests": [
                {"selected_definitive": true, "result": "A"},
                {"selected_definitive": 1, "result": "B"}
            ]
        }));
        assert_eq!(resolve_result(&mixed), ResultResolution::Ambiguous(2));

        let not_flags = record(json!({
            "tests": [
                {"selected_definitive": "true", "result": "A"},
                {"selected_definitive": 0, "result": "B"},
                {"selected_definitive": 2, "result": "C"},
                "not a test"
            ]
        }));
        assert_eq!(resolve_result(&not_flags), ResultResolution::NoDefinitive);
    }

    #[test]
    fn test_sub_area_derivation() {
        let nested = record(json!({"_sub_administrative_area": {"_id": "a7", "name": "Dane"}}));
        assert_eq!(
            normalize_sample(&nested).sub_administrative_area_id,
            Some(json!("a7"))
        );

        let not_an_object = record(json!({"_sub_administrative_area": "a7"}));
        assert_eq!(normalize_sample(&not_an_object).sub_administrative_area_id, None);

        let without_id = record(json!({
            "sub_administrative_area_id": 12,
            "_sub_administrative_area": {"name": "Dane"}
        }));
        assert_eq!(
            normalize_sample(&without_id).sub_administrative_area_id,
            Some(json!(12))
        );
    }

    #[test]
    fn test_existing_canonical_fields_are_kept() {
        let raw = record(json!({
            "id": "legacy",
            "species": "white-tailed deer",
            "age_group": "adult",
            "sex": null,
            "sample_source": "hunter harvest",
            "extra": {"ignored": true}
        }));

        let sample = normalize_sample(&raw);

        assert_eq!(sample.id, Some(json!("legacy")));
        assert_eq!(sample.species, Some(json!("white-tailed deer")));
        assert_eq!(sample.age_group, Some(json!("adult")));
        assert_eq!(sample.sex, None);
        assert_eq!(sample.sample_source, Some(json!("hunter harvest")));
    }

    #[test]
    fn test_warehouse_id_overrides_existing_id() {
        let raw = record(json!({"id": "legacy", "_id": "s9"}));
        assert_eq!(normalize_sample(&raw).id, Some(json!("s9")));

        let null_id = record(json!({"id": "legacy", "_id": null}));
        assert_eq!(normalize_sample(&null_id).id, None);
    }

    #[test]
    fn test_empty_record_yields_all_null_fields() {
        let sample = normalize_sample(&Record::new());
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_normalize_samples_summary() {
        let records = vec![
            record(json!({"tests": [{"selected_definitive": true, "result": "A"}]})),
            record(json!({"tests": [
                {"selected_definitive": true, "result": "A"},
                {"selected_definitive": true, "result": "B"}
            ]})),
            record(json!({"tests": [{"selected_definitive": false}]})),
            record(json!({})),
        ];

        let (samples, summary) = normalize_samples(&records);

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].result, Some(json!("A")));
        assert_eq!(
            summary,
            ResolutionSummary {
                definitive: 1,
                no_definitive: 1,
                ambiguous: 1,
                no_tests: 1,
            }
        );
    }

    #[test]
    fn test_normalize_sub_area() {
        let raw = record(json!({"_id": 42, "full_name": "Dane County", "geometry": {}}));
        let area = normalize_sub_area(&raw);
        assert_eq!(area.id, Some(json!(42)));
        assert_eq!(area.full_name, Some(json!("Dane County")));

        let legacy = record(json!({"id": "a1"}));
        let area = normalize_sub_area(&legacy);
        assert_eq!(area.id, Some(json!("a1")));
        assert_eq!(area.full_name, None);

        assert_eq!(normalize_sub_areas(&[raw, legacy]).len(), 2);
    }
}
