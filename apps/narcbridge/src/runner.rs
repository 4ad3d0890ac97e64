//! External CodeNarc invocation.
//!
//! The runner blocks until the linter exits. No timeout is applied here;
//! callers that need a deadline enforce it around the whole analysis.

use crate::error::AnalysisError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Inputs of one linter run. The linter is expected to write its XML
/// report to `report` before exiting.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source_dirs: Vec<PathBuf>,
    pub includes: String,
    pub ruleset: PathBuf,
    pub report: PathBuf,
    pub title: String,
}

/// Seam for invoking the linter; tests substitute a fake.
pub trait LinterRunner {
    fn run(&self, request: &RunRequest) -> Result<(), AnalysisError>;
}

#[derive(Debug, Clone)]
/// Runs the CodeNarc command-line tool.
pub struct CodeNarcCommand {
    pub program: String,
    /// Leading arguments, e.g. `-cp lib/* org.codenarc.CodeNarc` for `java`.
    pub args: Vec<String>,
}

impl Default for CodeNarcCommand {
    fn default() -> Self {
        Self {
            program: "codenarc".to_string(),
            args: Vec::new(),
        }
    }
}

impl CodeNarcCommand {
    /// Build from a command line split into words; empty means the default.
    pub fn from_words(words: &[String]) -> Self {
        match words.split_first() {
            Some((program, args)) => Self {
                program: program.clone(),
                args: args.to_vec(),
            },
            None => Self::default(),
        }
    }

    /// Full argument list passed to `program`.
    ///
    /// CodeNarc scans a single base directory, so several source dirs are
    /// folded into their deepest common ancestor with one include pattern
    /// per dir. No dirs leaves `-basedir` to CodeNarc's default.
    pub fn arguments(&self, request: &RunRequest) -> Vec<String> {
        let mut args = self.args.clone();
        let (basedir, includes) = match common_ancestor(&request.source_dirs) {
            Some(base) => {
                let includes = scoped_includes(&base, &request.source_dirs, &request.includes);
                (Some(base), includes)
            }
            None => (None, request.includes.clone()),
        };
        if let Some(base) = basedir {
            args.push(format!("-basedir={}", base.to_string_lossy()));
        }
        args.push(format!("-includes={}", includes));
        args.push(format!(
            "-rulesetfiles=file:{}",
            request.ruleset.to_string_lossy()
        ));
        args.push(format!("-report=xml:{}", request.report.to_string_lossy()));
        args.push(format!("-title={}", request.title));
        args
    }
}

fn common_ancestor(dirs: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = dirs.split_first()?;
    let mut base = first.clone();
    for dir in rest {
        while !dir.starts_with(&base) {
            if !base.pop() {
                return None;
            }
        }
    }
    (!base.as_os_str().is_empty()).then_some(base)
}

/// Prefix each include glob with the dir's path below `base`.
fn scoped_includes(base: &Path, dirs: &[PathBuf], includes: &str) -> String {
    let mut scoped: Vec<String> = Vec::new();
    for dir in dirs {
        let rel = pathdiff::diff_paths(dir, base)
            .unwrap_or_default()
            .to_string_lossy()
            .replace('\\', "/");
        for glob in includes.split(',').map(str::trim).filter(|g| !g.is_empty()) {
            let pattern = if rel.is_empty() {
                glob.to_string()
            } else {
                format!("{}/{}", rel.trim_end_matches('/'), glob)
            };
            if !scoped.contains(&pattern) {
                scoped.push(pattern);
            }
        }
    }
    scoped.join(",")
}

impl LinterRunner for CodeNarcCommand {
    fn run(&self, request: &RunRequest) -> Result<(), AnalysisError> {
        let args = self.arguments(request);
        tracing::info!(program = %self.program, dirs = request.source_dirs.len(), "running CodeNarc");
        tracing::debug!(?args, "CodeNarc arguments");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| AnalysisError::Launch {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::LinterFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: tail_lines(&stderr, 20),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_completion(&stdout) {
            Some(c) => tracing::info!(
                p1 = c.p1,
                p2 = c.p2,
                p3 = c.p3,
                millis = c.millis,
                "CodeNarc completed"
            ),
            None => tracing::debug!("CodeNarc exited without a completion line"),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Violation counts per priority from CodeNarc's closing line.
pub struct Completion {
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
    pub millis: u64,
}

fn completion_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"CodeNarc completed: \(p1=(\d+); p2=(\d+); p3=(\d+)\) (\d+)ms").ok()
    })
    .as_ref()
}

/// Find `CodeNarc completed: (p1=0; p2=1; p3=2) 345ms` in linter output.
pub fn parse_completion(stdout: &str) -> Option<Completion> {
    let caps = completion_re()?.captures(stdout)?;
    Some(Completion {
        p1: caps[1].parse().ok()?,
        p2: caps[2].parse().ok()?,
        p3: caps[3].parse().ok()?,
        millis: caps[4].parse().ok()?,
    })
}

fn tail_lines(s: &str, n: usize) -> String {
    let lines: Vec<&str> = s.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
