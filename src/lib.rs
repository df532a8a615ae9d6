// ==============================================================================
// lib.rs - Prevalence Estimator Data Export Library
// ==============================================================================
// Description: Library interface for the model input/output staging modules
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod output;
pub mod parsers;
pub mod processor;
pub mod report;
