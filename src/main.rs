// ==============================================================================
// main.rs - Prevalence Estimator Data Export Entry Point
// ==============================================================================
// Description: Stages warehouse data before the prevalence estimator model
//              runs (input) and packages its results afterwards (output)
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::any::Any;
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use prevalence_export::config::{StagingPaths, DEFAULT_DATA_DIR};
use prevalence_export::error::{exit_status, MissingInput, EXIT_FAILURE};
use prevalence_export::logging::{init_logging, LogMode};
use prevalence_export::processor::{InputProcessor, OutputProcessor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory shared with the warehouse and the model
    #[arg(short, long, env = "PREVALENCE_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    stage: Stage,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Convert warehouse exports into model input CSVs (before the model runs)
    Input,
    /// Convert the model output matrix into an XLSX workbook (after the model runs)
    Output,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let paths = StagingPaths::new(&args.data_dir);

    let log_mode = match args.stage {
        Stage::Input => LogMode::Truncate,
        Stage::Output => LogMode::Append,
    };

    if let Err(e) = paths
        .ensure_layout()
        .and_then(|_| init_logging(&paths.execution_log(), log_mode))
    {
        eprintln!("Failed to set up execution log: {:#}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    info!("Prevalence export starting: {:?} stage in {:?}", args.stage, paths.data_dir());

    // Explicit error boundary: every failure, including a panic, ends up in
    // the execution log before the process exits
    let stage = args.stage;
    let outcome = panic::catch_unwind(move || run(stage, paths))
        .unwrap_or_else(|payload| Err(anyhow::anyhow!("panic: {}", panic_message(payload.as_ref()))));

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<MissingInput>().is_some() {
                error!("Execution halted: {:#}", e);
            } else {
                error!("Uncaught exception: {:?}", e);
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run(stage: Stage, paths: StagingPaths) -> Result<()> {
    match stage {
        Stage::Input => {
            let summary = InputProcessor::new(paths).process()?;
            info!(
                "Input staging complete: {} parameters, {} samples, {} sub-administrative areas",
                summary.parameters, summary.samples, summary.sub_areas
            );
        }
        Stage::Output => {
            let summary = OutputProcessor::new(paths).process()?;
            info!(
                "Output staging complete: {} rows x {} columns written to {:?}",
                summary.rows, summary.columns, summary.workbook
            );
        }
    }

    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
