//! Shared data models: violations read from reports, rule identities, and
//! the issues handed to the host sink.

pub mod profile;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One finding from a CodeNarc report, in document order.
pub struct Violation {
    pub rule_key: String,
    /// File path as written by the linter, usually relative to its basedir.
    pub file: String,
    pub line: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
/// Canonical rule identity inside the host catalog.
pub struct RuleRef {
    pub repository: String,
    pub key: String,
}

impl RuleRef {
    pub fn new(repository: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Issue severity, ordered from least to most severe.
pub enum Severity {
    Info,
    Minor,
    #[default]
    Major,
    Critical,
    Blocker,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
            Severity::Blocker => "blocker",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A finalized issue bound to a rule and a tracked file.
pub struct Issue {
    pub rule: RuleRef,
    pub severity: Severity,
    pub file: String,
    pub absolute_path: PathBuf,
    /// `None` for file-level issues.
    pub line: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Per-run tally of the violation fold.
pub struct Summary {
    pub violations: usize,
    pub issues: usize,
    pub unknown_rules: usize,
    pub unknown_files: usize,
    pub unattached: usize,
}

impl Summary {
    /// Violations that produced no issue.
    pub fn skipped(&self) -> usize {
        self.unknown_rules + self.unknown_files + self.unattached
    }
}
