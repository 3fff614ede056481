//! scorecard-core: Scoring, aggregation, and report assembly engine.
//!
//! This crate defines the input data model, the scoring rules, the
//! per-test aggregation, and the orchestrator that turns a student's answer
//! records into charts and a report document through pluggable renderers.

pub mod aggregate;
pub mod chart;
pub mod classify;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod insights;
pub mod loader;
pub mod mock;
pub mod model;
pub mod report;
pub mod traits;
