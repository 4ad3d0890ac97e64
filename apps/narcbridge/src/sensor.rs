//! CodeNarc sensor: the analysis driver.
//!
//! One run goes through these stages:
//! - decide whether to run at all (active CodeNarc rules and Groovy files);
//! - source a report, either the configured one or a fresh CodeNarc run;
//! - parse it into violations;
//! - fold each violation through rule resolution, file resolution and
//!   emission, counting misses instead of failing on them.
//!
//! A skipped run is a normal outcome. Failing to launch the linter, a
//! non-zero linter exit, or an unreadable report aborts the run.

use crate::emit::{emit, Emission, IssueSink};
use crate::error::AnalysisError;
use crate::files::{FileSystemView, GroovyFiles};
use crate::models::{Summary, Violation};
use crate::report;
use crate::rules::{RuleProfile, RuleResolver, REPOSITORY_KEY};
use crate::ruleset;
use crate::runner::{LinterRunner, RunRequest};
use std::fmt;
use std::fs;
use std::path::PathBuf;

pub const RULESET_FILE: &str = "codenarc-ruleset.xml";
pub const REPORT_FILE: &str = "codenarc-report.xml";

#[derive(Debug, Clone, Default)]
/// Settings of one analysis run, resolved by the caller.
pub struct Settings {
    /// Pre-generated report; unset or empty means run CodeNarc.
    pub report_path: Option<PathBuf>,
    /// Directories handed to CodeNarc when it is run.
    pub source_dirs: Vec<PathBuf>,
    /// Where the ruleset and generated report are written.
    pub work_dir: PathBuf,
    /// CodeNarc `-includes` patterns, comma-separated.
    pub includes: String,
    pub title: String,
}

impl Settings {
    fn configured_report(&self) -> Option<&PathBuf> {
        self.report_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Completed(Summary),
}

impl Outcome {
    pub fn summary(&self) -> Summary {
        match self {
            Outcome::Skipped => Summary::default(),
            Outcome::Completed(s) => *s,
        }
    }
}

pub struct CodeNarcSensor<'a> {
    settings: &'a Settings,
    fs: &'a dyn FileSystemView,
    profile: &'a dyn RuleProfile,
    runner: &'a dyn LinterRunner,
}

impl<'a> CodeNarcSensor<'a> {
    pub fn new(
        settings: &'a Settings,
        fs: &'a dyn FileSystemView,
        profile: &'a dyn RuleProfile,
        runner: &'a dyn LinterRunner,
    ) -> Self {
        Self {
            settings,
            fs,
            profile,
            runner,
        }
    }

    pub fn should_execute_on_project(&self) -> bool {
        !self
            .profile
            .active_rules_by_repository(REPOSITORY_KEY)
            .is_empty()
            && GroovyFiles::new(self.fs).has_groovy_files()
    }

    /// Run the analysis, handing every resolved violation to `sink`.
    pub fn analyse(&self, sink: &mut dyn IssueSink) -> Result<Outcome, AnalysisError> {
        if !self.should_execute_on_project() {
            tracing::info!("no active CodeNarc rules or no Groovy files; skipping");
            return Ok(Outcome::Skipped);
        }
        let violations = self.source_violations()?;
        let summary = self.process(violations, sink);
        tracing::info!(
            violations = summary.violations,
            issues = summary.issues,
            skipped = summary.skipped(),
            "CodeNarc analysis done"
        );
        Ok(Outcome::Completed(summary))
    }

    fn source_violations(&self) -> Result<Vec<Violation>, AnalysisError> {
        if let Some(path) = self.settings.configured_report() {
            tracing::debug!(path = %path.display(), "reading configured CodeNarc report");
            return report::parse_report(path);
        }
        let report = self.run_codenarc()?;
        report::parse_report(&report)
    }

    fn run_codenarc(&self) -> Result<PathBuf, AnalysisError> {
        let work_dir = &self.settings.work_dir;
        fs::create_dir_all(work_dir).map_err(|e| AnalysisError::io(work_dir, e))?;
        let rules = self.profile.active_rules_by_repository(REPOSITORY_KEY);
        let ruleset_path = work_dir.join(RULESET_FILE);
        ruleset::write_ruleset(&ruleset_path, &rules)?;
        let report = work_dir.join(REPORT_FILE);
        // A report left by an earlier run must not stand in for this one.
        if report.exists() {
            fs::remove_file(&report).map_err(|e| AnalysisError::io(&report, e))?;
        }
        let request = RunRequest {
            source_dirs: self.settings.source_dirs.clone(),
            includes: self.settings.includes.clone(),
            ruleset: ruleset_path,
            report: report.clone(),
            title: self.settings.title.clone(),
        };
        self.runner.run(&request)?;
        Ok(report)
    }

    fn process(&self, violations: Vec<Violation>, sink: &mut dyn IssueSink) -> Summary {
        let rules = RuleResolver::new(self.profile.active_rules_by_repository(REPOSITORY_KEY));
        let files = GroovyFiles::new(self.fs);
        violations.iter().fold(Summary::default(), |mut s, v| {
            s.violations += 1;
            let rule = rules.resolve(&v.rule_key);
            let file = rule.and_then(|_| files.resolve(&v.file));
            match emit(sink, rule, file, v.line, &v.message) {
                Emission::Emitted => s.issues += 1,
                Emission::UnknownRule => s.unknown_rules += 1,
                Emission::UnknownFile => s.unknown_files += 1,
                Emission::Unattached => s.unattached += 1,
            }
            s
        })
    }
}

impl fmt::Display for CodeNarcSensor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeNarc")
    }
}
