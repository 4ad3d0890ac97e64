//! Configuration discovery and effective settings resolution.
//!
//! narcbridge reads `narcbridge.toml|yaml|yml` from the project root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `profile`: `narcbridge-profile.toml`
//! - `output`: `human`
//! - `workDir`: `.narcbridge`
//! - `sources.main`: `["src/main/groovy"]`, `sources.test`: `["src/test/groovy"]`
//! - `sources.suffixes`: `[".groovy"]`
//! - `codenarc.command`: `["codenarc"]`
//! - `codenarc.reportPath`: unset (CodeNarc is run)
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::AnalysisError;
use crate::sensor::Settings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_NAMES: [&str; 3] = ["narcbridge.toml", "narcbridge.yaml", "narcbridge.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Source layout section under `[sources]`.
pub struct SourcesCfg {
    pub main: Option<Vec<String>>,
    pub test: Option<Vec<String>>,
    pub suffixes: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Linter section under `[codenarc]`.
pub struct CodeNarcCfg {
    #[serde(rename = "reportPath")]
    pub report_path: Option<String>,
    /// Command line used to start CodeNarc, program first.
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `narcbridge.toml|yaml`.
pub struct BridgeConfig {
    pub profile: Option<String>,
    pub output: Option<String>,
    #[serde(rename = "workDir")]
    pub work_dir: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub sources: Option<SourcesCfg>,
    #[serde(default)]
    pub codenarc: Option<CodeNarcCfg>,
}

#[derive(Debug, Default, Clone)]
/// CLI values; `None` or empty means "not given".
pub struct CliOverrides {
    pub base_dir: Option<String>,
    pub profile: Option<String>,
    pub report_path: Option<String>,
    pub source_dirs: Vec<String>,
    pub work_dir: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub base_dir: PathBuf,
    pub profile: PathBuf,
    /// Whether the profile path came from CLI or config rather than defaults.
    pub profile_configured: bool,
    pub output: String,
    pub work_dir: PathBuf,
    pub title: String,
    pub main_dirs: Vec<PathBuf>,
    pub test_dirs: Vec<PathBuf>,
    pub suffixes: Vec<String>,
    pub report_path: Option<PathBuf>,
    pub command: Vec<String>,
}

impl Effective {
    /// Core settings for one sensor run.
    pub fn sensor_settings(&self) -> Settings {
        Settings {
            report_path: self.report_path.clone(),
            source_dirs: self.main_dirs.clone(),
            work_dir: self.work_dir.clone(),
            includes: includes_for(&self.suffixes),
            title: self.title.clone(),
        }
    }
}

/// CodeNarc `-includes` value for the configured suffixes.
pub fn includes_for(suffixes: &[String]) -> String {
    suffixes
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.starts_with('.') {
                format!("**/*{}", s)
            } else {
                format!("**/*.{}", s)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when a `narcbridge.toml|yaml|yml` or a `.git` directory is found.
/// `start` is canonicalized first so `.` can walk above the working dir.
pub fn detect_project_root(start: &Path) -> PathBuf {
    let start = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    let mut cur = start.as_path();
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start,
        }
    }
}

/// Load `BridgeConfig` from `narcbridge.toml` or `narcbridge.yaml|yml`.
///
/// Returns `Ok(None)` when no config file exists; a file that exists but
/// does not parse is an error.
pub fn load_config(root: &Path) -> Result<Option<BridgeConfig>, AnalysisError> {
    let toml_path = root.join(CONFIG_NAMES[0]);
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).map_err(|e| AnalysisError::io(&toml_path, e))?;
        let cfg: BridgeConfig = toml::from_str(&s)
            .map_err(|e| AnalysisError::config(format!("{}: {}", toml_path.display(), e)))?;
        return Ok(Some(cfg));
    }
    for yml in &CONFIG_NAMES[1..] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).map_err(|e| AnalysisError::io(&p, e))?;
            let cfg: BridgeConfig = serde_yaml::from_str(&s)
                .map_err(|e| AnalysisError::config(format!("{}: {}", p.display(), e)))?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

fn to_dirs(dirs: Vec<String>) -> Vec<PathBuf> {
    dirs.into_iter()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// Relative paths are anchored on the detected project root.
pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective, AnalysisError> {
    let start = PathBuf::from(cli.base_dir.as_deref().unwrap_or("."));
    let base_dir = detect_project_root(&start);
    let cfg = load_config(&base_dir)?.unwrap_or_default();
    let sources = cfg.sources.clone().unwrap_or_default();
    let codenarc = cfg.codenarc.clone().unwrap_or_default();

    let profile_src = non_empty(cli.profile.clone()).or(non_empty(cfg.profile));
    let profile_configured = profile_src.is_some();
    let profile = base_dir.join(profile_src.unwrap_or_else(|| "narcbridge-profile.toml".to_string()));

    let output = non_empty(cli.output.clone())
        .or(non_empty(cfg.output))
        .unwrap_or_else(|| "human".to_string());

    let work_dir = base_dir.join(
        non_empty(cli.work_dir.clone())
            .or(non_empty(cfg.work_dir))
            .unwrap_or_else(|| ".narcbridge".to_string()),
    );

    let title = non_empty(cfg.title).unwrap_or_else(|| {
        base_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string())
    });

    // CLI source dirs replace the configured main dirs entirely
    let main_dirs = if cli.source_dirs.is_empty() {
        to_dirs(
            sources
                .main
                .unwrap_or_else(|| vec!["src/main/groovy".to_string()]),
        )
    } else {
        to_dirs(cli.source_dirs.clone())
    };
    let test_dirs = to_dirs(
        sources
            .test
            .unwrap_or_else(|| vec!["src/test/groovy".to_string()]),
    );
    let main_dirs = main_dirs.into_iter().map(|d| base_dir.join(d)).collect();
    let test_dirs = test_dirs.into_iter().map(|d| base_dir.join(d)).collect();

    let suffixes = sources
        .suffixes
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| vec![".groovy".to_string()]);

    let report_path = non_empty(cli.report_path.clone())
        .or(non_empty(codenarc.report_path))
        .map(|p| base_dir.join(p));

    let command = codenarc
        .command
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| vec!["codenarc".to_string()]);

    Ok(Effective {
        base_dir,
        profile,
        profile_configured,
        output,
        work_dir,
        title,
        main_dirs,
        test_dirs,
        suffixes,
        report_path,
        command,
    })
}
