// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for warehouse exports and model output files
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

pub mod ndjson;
pub mod params;
pub mod model_output;

pub use ndjson::{NdjsonParser, NdjsonParseError};
pub use params::{ParamsParser, ParamsParseError};
pub use model_output::{ModelOutputParser, ModelOutputTable, ModelOutputParseError};
