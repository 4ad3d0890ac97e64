//! Structured error types for the analysis pipeline.
//!
//! Only run-level failures live here. A violation whose rule or file does
//! not resolve is not an error; the sensor counts it and moves on.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::report::ReportError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed report {}: {source}", path.display())]
    MalformedReport {
        path: PathBuf,
        source: ReportError,
    },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    LinterFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("invalid profile {}: {reason}", path.display())]
    Profile { path: PathBuf, reason: String },

    #[error("config: {0}")]
    Config(String),

    #[error("ruleset: {0}")]
    Ruleset(#[from] quick_xml::Error),
}

impl AnalysisError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn profile(path: &Path, reason: impl Into<String>) -> Self {
        Self::Profile {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
