// ==============================================================================
// processor.rs - Staging Pipelines
// ==============================================================================
// Description: Input staging (warehouse exports -> model CSVs) and output
//              staging (model matrix -> XLSX workbook)
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::{StagingPaths, EXECUTION_LOG_FILE, NARRATIVE_FILE, WORKBOOK_FILE};
use crate::error::MissingInput;
use crate::models::{Attachment, AttachmentRole, Sample, SubAdministrativeArea};
use crate::normalizer::{normalize_samples, normalize_sub_areas, ResolutionSummary};
use crate::output::{write_table_file, write_workbook, OutputFormat};
use crate::parsers::{ModelOutputParser, NdjsonParser, ParamsParser};
use crate::report::{display_value, Manifest, Narrative, RunReport};

/// Model name shown in the run report
pub const MODEL_NAME: &str = "Prevalence Estimator Data Export";

/// Mandatory inputs of the two pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingInput {
    Parameters,
    Samples,
    SubAdministrativeAreas,
    ModelOutput,
}

impl StagingInput {
    pub fn label(&self) -> &'static str {
        match self {
            StagingInput::Parameters => "Parameters (params.json)",
            StagingInput::Samples => "Samples (sample.ndJson)",
            StagingInput::SubAdministrativeAreas => {
                "Sub-administrative areas (sub_administrative_area.ndJson)"
            }
            StagingInput::ModelOutput => "Model output (SpeedGoatOutputMatrix.csv)",
        }
    }

    /// Message shown to end users in the narrative log
    pub fn narrative_message(&self) -> &'static str {
        match self {
            StagingInput::Parameters => "Parameters (params.json) file not found.",
            StagingInput::Samples => {
                "Samples (sample.ndJson) file not found. Sample data are required to run this model. Execution halted."
            }
            StagingInput::SubAdministrativeAreas => {
                "Sub-administrative areas (sub_administrative_area.ndJson) file not found."
            }
            StagingInput::ModelOutput => {
                "SpeedGoatOutputMatrix.csv not found or could not be imported."
            }
        }
    }
}

/// Load a mandatory input, recording a fatal error entry if it fails
fn load_or_halt<T, E, F>(
    report: &mut RunReport,
    input: StagingInput,
    path: &Path,
    load: F,
) -> Result<T>
where
    E: std::fmt::Display,
    F: FnOnce(&Path) -> Result<T, E>,
{
    match load(path) {
        Ok(loaded) => Ok(loaded),
        Err(e) => {
            error!("{} could not be loaded from {:?}: {}", input.label(), path, e);
            report.narrative.error(input.narrative_message())?;
            Err(MissingInput::new(input.label(), path, e).into())
        }
    }
}

/// Result of a successful input staging run
#[derive(Debug, Clone, PartialEq)]
pub struct InputSummary {
    pub provider_area: Value,
    pub parameters: usize,
    pub samples: usize,
    pub sub_areas: usize,
    pub resolution: ResolutionSummary,
}

/// Stages warehouse exports as model input CSVs
pub struct InputProcessor {
    paths: StagingPaths,
}

impl InputProcessor {
    pub fn new(paths: StagingPaths) -> Self {
        Self { paths }
    }

    /// Main input pipeline
    ///
    /// The manifest is written whether or not staging succeeds, so the
    /// warehouse can always offer the execution log and narrative.
    pub fn process(&self) -> Result<InputSummary> {
        self.paths.ensure_layout()?;

        let narrative = Narrative::create(&self.paths.narrative())?;

        let mut manifest = Manifest::new();
        manifest.push(Attachment::new(
            EXECUTION_LOG_FILE,
            OutputFormat::Log.mime_type(),
            AttachmentRole::Downloadable,
        ));
        manifest.push(Attachment::new(
            NARRATIVE_FILE,
            OutputFormat::Html.mime_type(),
            AttachmentRole::Feedback,
        ));

        let mut report = RunReport::new(narrative, manifest, self.paths.manifest());

        let outcome = self.stage(&mut report);
        let finished = report.finish();

        let summary = outcome?;
        finished?;
        Ok(summary)
    }

    fn stage(&self, report: &mut RunReport) -> Result<InputSummary> {
        let started = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        report.narrative.heading("Model Execution Summary")?;
        report.narrative.paragraph(&format!("Model: {}", MODEL_NAME))?;
        report.narrative.paragraph(&format!("Date: {} GMT", started))?;

        info!("Model: {}", MODEL_NAME);
        info!("Date: {} GMT", started);
        info!("This log records data for debugging purposes in the case of a model execution error.");

        // 1. Parameters
        let params = load_or_halt(
            report,
            StagingInput::Parameters,
            &self.paths.params(),
            |path| ParamsParser::parse(path),
        )?;
        info!("Parameter file loaded successfully");

        report.narrative.paragraph(&format!(
            "Provider area: {}",
            display_value(&params.provider_area)
        ))?;
        report.narrative.subheading("User provided parameters:")?;
        report.narrative.list(&params.values)?;

        // 2. Samples
        let raw_samples = load_or_halt(
            report,
            StagingInput::Samples,
            &self.paths.samples(),
            |path| NdjsonParser::parse(path),
        )?;
        info!("Sample file loaded successfully");

        report.narrative.subheading("Warehouse data provided to model")?;
        report.narrative.paragraph(&format!("Samples: {}", raw_samples.len()))?;

        let (samples, resolution) = normalize_samples(&raw_samples);
        debug!("Result resolution: {:?}", resolution);
        if resolution.ambiguous > 0 {
            warn!(
                "{} samples have more than one selected definitive test; result left empty",
                resolution.ambiguous
            );
        }

        // 3. Sub-administrative areas
        let raw_sub_areas = load_or_halt(
            report,
            StagingInput::SubAdministrativeAreas,
            &self.paths.sub_areas(),
            |path| NdjsonParser::parse(path),
        )?;
        info!("Sub-administrative area file loaded successfully");

        report.narrative.paragraph(&format!(
            "Sub-administrative areas: {}",
            raw_sub_areas.len()
        ))?;

        let sub_areas = normalize_sub_areas(&raw_sub_areas);

        // 4. Model input tables, only once every input is known good
        write_table_file(
            &self.paths.params_csv(),
            &params.columns(),
            std::slice::from_ref(&params.values),
        )?;
        write_table_file(&self.paths.samples_csv(), &Sample::COLUMNS, &samples)?;
        write_table_file(
            &self.paths.sub_areas_csv(),
            &SubAdministrativeArea::COLUMNS,
            &sub_areas,
        )?;

        info!("Model input processing successfully completed.");

        Ok(InputSummary {
            provider_area: params.provider_area.clone(),
            parameters: params.values.len(),
            samples: samples.len(),
            sub_areas: sub_areas.len(),
            resolution,
        })
    }
}

/// Result of a successful output staging run
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSummary {
    pub workbook: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Stages the model output matrix as a downloadable workbook
pub struct OutputProcessor {
    paths: StagingPaths,
}

impl OutputProcessor {
    pub fn new(paths: StagingPaths) -> Self {
        Self { paths }
    }

    /// Main output pipeline
    pub fn process(&self) -> Result<OutputSummary> {
        self.paths.ensure_layout()?;

        let narrative = Narrative::append(&self.paths.narrative())?;
        let manifest = Manifest::load(&self.paths.manifest())?;
        let mut report = RunReport::new(narrative, manifest, self.paths.manifest());

        let outcome = self.stage(&mut report);
        let finished = report.finish();

        let summary = outcome?;
        finished?;
        Ok(summary)
    }

    fn stage(&self, report: &mut RunReport) -> Result<OutputSummary> {
        report.narrative.heading("Model Exports")?;

        let table = load_or_halt(
            report,
            StagingInput::ModelOutput,
            &self.paths.model_output(),
            |path| ModelOutputParser::parse(path),
        )?;
        info!(
            "Model output loaded: {} rows, {} columns",
            table.rows.len(),
            table.column_count()
        );

        let workbook = self.paths.workbook();
        write_workbook(&workbook, &table)?;

        report.attach(Attachment::new(
            WORKBOOK_FILE,
            OutputFormat::Xlsx.mime_type(),
            AttachmentRole::Downloadable,
        ));

        report.narrative.paragraph("Model exports successfully created.")?;
        info!("Model output processing successfully completed.");

        Ok(OutputSummary {
            workbook,
            rows: table.rows.len(),
            columns: table.column_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{exit_status, EXIT_MISSING_INPUT};
    use serde_json::json;
    use tempfile::TempDir;

    const PARAMS: &str = r#"{
        "season_year": 2024,
        "_provider": {"_administrative_area": {"administrative_area": "Wisconsin"}},
        "design_prevalence": 0.01,
        "method": "weighted"
    }"#;

    const SAMPLES: &str = "\
{\"_id\": \"s1\", \"species\": \"deer\", \"_sub_administrative_area\": {\"_id\": \"a1\"}, \"tests\": [{\"selected_definitive\": true, \"result\": \"positive\"}, {\"selected_definitive\": false, \"result\": \"negative\"}]}
{\"_id\": \"s2\", \"tests\": [{\"selected_definitive\": true, \"result\": \"A\"}, {\"selected_definitive\": true, \"result\": \"B\"}]}
{\"sex\": \"female\", \"age_group\": \"adult\", \"sample_source\": \"roadkill\"}
";

    const SUB_AREAS: &str = "\
{\"_id\": \"a1\", \"full_name\": \"Dane County\"}
{\"_id\": \"a2\", \"full_name\": \"Iowa County\", \"geometry\": null}
";

    fn data_dir() -> (TempDir, StagingPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = StagingPaths::new(dir.path());
        (dir, paths)
    }

    fn write_inputs(paths: &StagingPaths) {
        std::fs::write(paths.params(), PARAMS).unwrap();
        std::fs::write(paths.samples(), SAMPLES).unwrap();
        std::fs::write(paths.sub_areas(), SUB_AREAS).unwrap();
    }

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    fn manifest_filenames(paths: &StagingPaths) -> Vec<String> {
        Manifest::load(&paths.manifest())
            .unwrap()
            .attachments()
            .iter()
            .map(|a| a.filename.clone())
            .collect()
    }

    #[test]
    fn test_input_pipeline() {
        let (_dir, paths) = data_dir();
        write_inputs(&paths);

        let summary = InputProcessor::new(paths.clone()).process().unwrap();

        assert_eq!(summary.provider_area, json!("Wisconsin"));
        assert_eq!(summary.parameters, 3);
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.sub_areas, 2);
        assert_eq!(summary.resolution.ambiguous, 1);

        let params_csv = read(paths.params_csv());
        let lines: Vec<&str> = params_csv.lines().collect();
        assert_eq!(lines, vec![
            "\"season_year\",\"design_prevalence\",\"method\"",
            "2024,0.01,\"weighted\"",
        ]);

        let samples_csv = read(paths.samples_csv());
        let lines: Vec<&str> = samples_csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "\"id\",\"sub_administrative_area_id\",\"species\",\"age_group\",\"sex\",\"sample_source\",\"result\""
        );
        assert_eq!(lines[1], "\"s1\",\"a1\",\"deer\",\"\",\"\",\"\",\"positive\"");
        assert_eq!(lines[2], "\"s2\",\"\",\"\",\"\",\"\",\"\",\"\"");
        assert_eq!(lines[3], "\"\",\"\",\"\",\"adult\",\"female\",\"roadkill\",\"\"");

        let sub_areas_csv = read(paths.sub_areas_csv());
        let lines: Vec<&str> = sub_areas_csv.lines().collect();
        assert_eq!(lines, vec![
            "\"id\",\"full_name\"",
            "\"a1\",\"Dane County\"",
            "\"a2\",\"Iowa County\"",
        ]);

        let narrative = read(paths.narrative());
        assert!(narrative.starts_with("<h3>Model Execution Summary</h3>\n"));
        assert!(narrative.contains("<p>Provider area: Wisconsin</p>"));
        assert!(narrative.contains("<li>method: weighted</li>"));
        assert!(!narrative.contains("_provider"));
        assert!(narrative.contains("<p>Samples: 3</p>"));
        assert!(narrative.contains("<p>Sub-administrative areas: 2</p>"));
        assert!(!narrative.contains("ERROR"));

        assert_eq!(manifest_filenames(&paths), vec!["execution_log.log", "info.html"]);
    }

    #[test]
    fn test_missing_parameters_halts_before_any_output() {
        let (_dir, paths) = data_dir();
        std::fs::write(paths.samples(), SAMPLES).unwrap();
        std::fs::write(paths.sub_areas(), SUB_AREAS).unwrap();

        let error = InputProcessor::new(paths.clone()).process().unwrap_err();

        assert_eq!(exit_status(&error), EXIT_MISSING_INPUT);
        assert!(!paths.params_csv().exists());
        assert!(!paths.samples_csv().exists());
        assert!(!paths.sub_areas_csv().exists());

        let narrative = read(paths.narrative());
        assert_eq!(narrative.matches("<h4>ERROR</h4>").count(), 1);
        assert!(narrative.contains("<p>Parameters (params.json) file not found.</p>"));

        assert_eq!(manifest_filenames(&paths), vec!["execution_log.log", "info.html"]);
    }

    #[test]
    fn test_malformed_samples_halts_without_partial_output() {
        let (_dir, paths) = data_dir();
        write_inputs(&paths);
        std::fs::write(paths.samples(), "{\"_id\": \"s1\"}\nnot json\n").unwrap();

        let error = InputProcessor::new(paths.clone()).process().unwrap_err();

        assert_eq!(exit_status(&error), EXIT_MISSING_INPUT);
        assert!(!paths.params_csv().exists());
        assert!(!paths.samples_csv().exists());

        let narrative = read(paths.narrative());
        assert_eq!(narrative.matches("<h4>ERROR</h4>").count(), 1);
        assert!(narrative.contains("Sample data are required to run this model."));
    }

    #[test]
    fn test_missing_sub_areas_halts() {
        let (_dir, paths) = data_dir();
        std::fs::write(paths.params(), PARAMS).unwrap();
        std::fs::write(paths.samples(), SAMPLES).unwrap();

        let error = InputProcessor::new(paths.clone()).process().unwrap_err();

        assert_eq!(exit_status(&error), EXIT_MISSING_INPUT);
        assert!(!paths.samples_csv().exists());
        assert!(read(paths.narrative()).contains("Sub-administrative areas"));
    }

    #[test]
    fn test_output_pipeline_appends_to_report() {
        let (_dir, paths) = data_dir();
        write_inputs(&paths);
        InputProcessor::new(paths.clone()).process().unwrap();

        std::fs::write(
            paths.model_output(),
            "\"area\",\"n\",\"prevalence\"\n\"Dane\",143,0.0139\n\"Iowa\",87,NA\n",
        )
        .unwrap();

        let summary = OutputProcessor::new(paths.clone()).process().unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 3);
        assert!(summary.workbook.exists());

        let narrative = read(paths.narrative());
        assert!(narrative.starts_with("<h3>Model Execution Summary</h3>\n"));
        assert!(narrative.ends_with("<h3>Model Exports</h3>\n<p>Model exports successfully created.</p>\n"));

        let manifest = Manifest::load(&paths.manifest()).unwrap();
        let workbook = manifest.attachments().last().unwrap();
        assert_eq!(workbook.filename, "PrevalenceEstimatorData.xlsx");
        assert_eq!(
            workbook.content_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(workbook.role, AttachmentRole::Downloadable);
        assert_eq!(manifest.attachments().len(), 3);
    }

    #[test]
    fn test_output_pipeline_missing_matrix() {
        let (_dir, paths) = data_dir();

        let error = OutputProcessor::new(paths.clone()).process().unwrap_err();

        assert_eq!(exit_status(&error), EXIT_MISSING_INPUT);
        assert!(!paths.workbook().exists());

        let narrative = read(paths.narrative());
        assert_eq!(
            narrative,
            "<h3>Model Exports</h3>\n<h4>ERROR</h4>\n<p>SpeedGoatOutputMatrix.csv not found or could not be imported.</p>\n"
        );
        assert!(manifest_filenames(&paths).is_empty());
    }
}
