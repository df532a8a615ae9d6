// ==============================================================================
// logging.rs - Execution Log Setup
// ==============================================================================
// Description: Tracing subscriber writing the operator execution log
//              (attachments/execution_log.log) and a compact console stream
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when RUST_LOG is not set
const DEFAULT_FILTER: &str = "prevalence_export=debug";

/// Timestamp format of execution log lines
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether the execution log starts over or continues an earlier pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Truncate,
    Append,
}

/// Initialize tracing with file and console output
///
/// Log lines are written synchronously so that everything logged before a
/// fatal exit is already in the execution log.
pub fn init_logging(log_path: &Path, mode: LogMode) -> Result<()> {
    if mode == LogMode::Truncate {
        File::create(log_path)
            .with_context(|| format!("Failed to truncate execution log {:?}", log_path))?;
    }

    let directory = log_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Execution log path has no parent: {:?}", log_path))?;
    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Execution log path has no file name: {:?}", log_path))?
        .to_string_lossy()
        .to_string();

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .context("Failed to open execution log")?;

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoUtc::new(LOG_TIME_FORMAT.to_string()))
        .with_writer(file_appender);

    let console_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
