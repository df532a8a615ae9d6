// ==============================================================================
// output.rs - Tabular and Spreadsheet Output Generation
// ==============================================================================
// Description: Writes the model input CSVs and the model output workbook
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::parsers::ModelOutputTable;

/// Worksheet name of the model output workbook
pub const WORKBOOK_SHEET_NAME: &str = "Data";

/// Cell text read as a missing value (the pandas default NA set); written
/// as blank cells
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Attachment formats recorded in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Model output workbook (downloadable)
    Xlsx,
    /// Narrative run report (feedback)
    Html,
    /// Execution log (downloadable)
    Log,
}

impl OutputFormat {
    /// Get MIME type recorded in attachments.json
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputFormat::Html => "text/html",
            OutputFormat::Log => "text/plain",
        }
    }
}

/// A record that can be laid out as one CSV row by column name
pub trait TableRow {
    /// Value for `column`, or `None` when the record has no such field
    fn cell(&self, column: &str) -> Option<&Value>;
}

/// Render one value for a model input CSV
///
/// Strings are always quoted, numbers never are. Null and missing values
/// become a quoted empty string; booleans are bare `True`/`False`. Nested values are flattened to compact JSON text.
pub fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => quote(""),
        Some(Value::String(text)) => quote(text),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(nested) => quote(&nested.to_string()),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Write a header row and one row per record to `writer`
///
/// Fields of a record that are not listed in `columns` are dropped.
/// Returns the number of data rows written.
pub fn write_table<W, R>(writer: W, columns: &[&str], rows: &[R]) -> Result<usize>
where
    W: Write,
    R: TableRow,
{
    // Cells are quoted by render_cell, the CSV writer must not quote again
    let mut csv_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);

    csv_writer
        .write_record(columns.iter().map(|column| quote(column)))
        .context("Failed to write CSV header")?;

    for row in rows {
        csv_writer
            .write_record(columns.iter().map(|column| render_cell(row.cell(column))))
            .context("Failed to write CSV row")?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;

    Ok(rows.len())
}

/// Write a model input CSV file
pub fn write_table_file<R: TableRow>(path: &Path, columns: &[&str], rows: &[R]) -> Result<usize> {
    info!("Generating CSV output: {:?}", path);

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV output file {:?}", path))?;

    let written = write_table(file, columns, rows)?;

    info!("CSV output complete: {} rows, {} columns", written, columns.len());

    Ok(written)
}

/// Cell of the model output workbook
#[derive(Debug, Clone, PartialEq)]
enum SpreadsheetCell<'a> {
    Blank,
    Number(f64),
    Boolean(bool),
    Text(&'a str),
}

impl<'a> SpreadsheetCell<'a> {
    fn from_text(text: &'a str) -> Self {
        if MISSING_MARKERS.contains(&text.trim()) {
            return SpreadsheetCell::Blank;
        }

        match text.trim() {
            "True" | "TRUE" | "true" => return SpreadsheetCell::Boolean(true),
            "False" | "FALSE" | "false" => return SpreadsheetCell::Boolean(false),
            _ => {}
        }

        match text.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => SpreadsheetCell::Number(number),
            _ => SpreadsheetCell::Text(text),
        }
    }
}

/// Write the model output matrix to a single-sheet XLSX workbook
///
/// The header row and every data row are transcribed as-is: no renaming,
/// no filtering, no index column.
pub fn write_workbook(path: &Path, table: &ModelOutputTable) -> Result<()> {
    info!("Generating XLSX output: {:?}", path);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(WORKBOOK_SHEET_NAME)
        .context("Failed to name worksheet")?;

    for (col_idx, header) in table.headers.iter().enumerate() {
        let col = u16::try_from(col_idx).context("Too many columns for a worksheet")?;
        worksheet
            .write_string(0, col, header)
            .context("Failed to write header cell")?;
    }

    for (row_idx, record) in table.rows.iter().enumerate() {
        let row = u32::try_from(row_idx + 1).context("Too many rows for a worksheet")?;

        for (col_idx, text) in record.iter().enumerate() {
            let col = u16::try_from(col_idx).context("Too many columns for a worksheet")?;

            match SpreadsheetCell::from_text(text) {
                SpreadsheetCell::Blank => {}
                SpreadsheetCell::Number(number) => {
                    worksheet
                        .write_number(row, col, number)
                        .with_context(|| format!("Failed to write cell ({}, {})", row, col))?;
                }
                SpreadsheetCell::Boolean(flag) => {
                    worksheet
                        .write_boolean(row, col, flag)
                        .with_context(|| format!("Failed to write cell ({}, {})", row, col))?;
                }
                SpreadsheetCell::Text(text) => {
                    worksheet
                        .write_string(row, col, text)
                        .with_context(|| format!("Failed to write cell ({}, {})", row, col))?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook {:?}", path))?;

    debug!(
        "XLSX output complete: {} rows, {} columns",
        table.rows.len(),
        table.column_count()
    );

    Ok(())
}
