// ==============================================================================
// report.rs - Run Report (Narrative Log and Attachment Manifest)
// ==============================================================================
// Description: User-facing HTML narrative (info.html) and the attachment
//              manifest (attachments.json) read by the data warehouse
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::Attachment;

/// HTML element wrapping one narrative line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlElement {
    H3,
    H4,
    P,
}

impl HtmlElement {
    pub fn tag(&self) -> &'static str {
        match self {
            HtmlElement::H3 => "h3",
            HtmlElement::H4 => "h4",
            HtmlElement::P => "p",
        }
    }
}

/// Append-only narrative log for end users (info.html)
///
/// Each entry is written straight to the file, so everything recorded
/// before a fatal error is already on disk when the process exits.
pub struct Narrative {
    file: File,
}

impl Narrative {
    /// Start a fresh narrative, discarding any previous run
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create narrative log {:?}", path))?;
        Ok(Self { file })
    }

    /// Continue the narrative of an earlier pipeline
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open narrative log {:?}", path))?;
        Ok(Self { file })
    }

    pub fn line(&mut self, element: HtmlElement, text: &str) -> Result<()> {
        let tag = element.tag();
        writeln!(self.file, "<{tag}>{text}</{tag}>").context("Failed to write narrative log")
    }

    pub fn heading(&mut self, text: &str) -> Result<()> {
        self.line(HtmlElement::H3, text)
    }

    pub fn subheading(&mut self, text: &str) -> Result<()> {
        self.line(HtmlElement::H4, text)
    }

    pub fn paragraph(&mut self, text: &str) -> Result<()> {
        self.line(HtmlElement::P, text)
    }

    /// Record a single error entry: an ERROR heading followed by the message
    pub fn error(&mut self, message: &str) -> Result<()> {
        self.subheading("ERROR")?;
        self.paragraph(message)
    }

    /// Record a JSON object as a nested HTML list
    pub fn list(&mut self, values: &Map<String, Value>) -> Result<()> {
        self.paragraph(&html_list(values))
    }
}

/// Render a JSON object as a nested `<ul>` list (`key: value` items)
pub fn html_list(values: &Map<String, Value>) -> String {
    let mut html = String::from("<ul>");

    for (key, value) in values {
        html.push_str("<li>");
        html.push_str(key);
        html.push_str(": ");

        match value {
            Value::Object(nested) => html.push_str(&html_list(nested)),
            Value::Array(items) => {
                html.push_str("<ul>");
                for item in items {
                    html.push_str("<li>");
                    html.push_str(&display_value(item));
                    html.push_str("</li>");
                }
                html.push_str("</ul>");
            }
            scalar => html.push_str(&display_value(scalar)),
        }

        html.push_str("</li>");
    }

    html.push_str("</ul>");
    html
}

/// Human-readable form of a JSON value (strings without quotes)
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// In-memory attachment manifest, written once when the run finishes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    attachments: Vec<Attachment>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the manifest left by an earlier pipeline
    ///
    /// A missing file is an empty manifest; a file that exists but is not a
    /// JSON list of attachments is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No attachment manifest at {:?}, starting empty", path);
            return Ok(Self::new());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open attachment manifest {:?}", path))?;
        let attachments: Vec<Attachment> = serde_json::from_reader(file)
            .with_context(|| format!("Attachment manifest {:?} is not a list", path))?;

        Ok(Self { attachments })
    }

    pub fn push(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create attachment manifest {:?}", path))?;
        serde_json::to_writer_pretty(file, &self.attachments)
            .context("Failed to write attachment manifest")?;

        debug!(
            "Attachment manifest written: {} entries to {:?}",
            self.attachments.len(),
            path
        );

        Ok(())
    }
}

/// Narrative and manifest of one pipeline invocation
pub struct RunReport {
    pub narrative: Narrative,
    pub manifest: Manifest,
    manifest_path: PathBuf,
}

impl RunReport {
    pub fn new(narrative: Narrative, manifest: Manifest, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            narrative,
            manifest,
            manifest_path: manifest_path.into(),
        }
    }

    /// Register an attachment in the manifest
    pub fn attach(&mut self, attachment: Attachment) {
        self.manifest.push(attachment);
    }

    /// Serialize the manifest; called once per run, on success and failure
    pub fn finish(self) -> Result<()> {
        self.manifest.save(&self.manifest_path)
    }
}
