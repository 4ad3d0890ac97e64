//! narcbridge core library.
//!
//! Runs CodeNarc over a project's Groovy sources (or reads an existing
//! CodeNarc XML report) and turns each violation into an issue attached to
//! an active rule and a tracked source file.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `discovery`: Project scan producing the tracked file set.
//! - `report`: Streaming parser for CodeNarc XML reports.
//! - `rules`: Active rules and violation-to-rule resolution.
//! - `files`: Tracked files and report-path-to-file resolution.
//! - `emit`: Issue construction and the host sink.
//! - `ruleset`: CodeNarc ruleset export for the active rules.
//! - `runner`: CodeNarc process invocation.
//! - `sensor`: The analysis run tying the above together.
//! - `models`: Violations, issues, summaries and the profile file.
//! - `output`: Human/JSON printers.
pub mod cli;
pub mod config;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod files;
pub mod models;
pub mod output;
pub mod report;
pub mod rules;
pub mod ruleset;
pub mod runner;
pub mod sensor;

pub use error::AnalysisError;
pub use sensor::{CodeNarcSensor, Outcome, Settings};
