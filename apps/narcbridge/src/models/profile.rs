//! Quality profile schema: the rules enabled for an analysis run.
//!
//! Profiles are TOML files listing one `[[rules]]` table per active rule:
//!
//! ```toml
//! [[rules]]
//! key = "EmptyClass"
//! config_key = "org.codenarc.rule.basic.EmptyClassRule"
//! severity = "minor"
//!
//! [[rules]]
//! key = "MethodSize"
//! config_key = "org.codenarc.rule.size.MethodSizeRule"
//! [rules.params]
//! maxLines = "50"
//! ```
//!
//! `repository` defaults to `codenarc`; `name` defaults to the rule name
//! derived from `config_key`.

use crate::error::AnalysisError;
use crate::models::{RuleRef, Severity};
use crate::rules::{rule_name_from_class, ActiveRule, RuleProfile, REPOSITORY_KEY};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
/// Root of a profile file.
pub struct ProfileFile {
    #[serde(default)]
    pub rules: Vec<ProfileRule>,
}

#[derive(Debug, Deserialize)]
/// One active rule entry.
pub struct ProfileRule {
    pub key: String,
    pub config_key: String,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl From<ProfileRule> for ActiveRule {
    fn from(r: ProfileRule) -> Self {
        let repository = r.repository.unwrap_or_else(|| REPOSITORY_KEY.to_string());
        ActiveRule {
            rule: RuleRef::new(repository, r.key),
            name: r.name.unwrap_or_else(|| rule_name_from_class(&r.config_key)),
            config_key: r.config_key,
            severity: r.severity.unwrap_or_default(),
            params: r.params,
        }
    }
}

#[derive(Debug, Default, Clone)]
/// Loaded profile; keeps rules in file order.
pub struct Profile {
    pub rules: Vec<ActiveRule>,
}

impl RuleProfile for Profile {
    fn active_rules_by_repository(&self, repository: &str) -> Vec<&ActiveRule> {
        self.rules.active_rules_by_repository(repository)
    }
}

/// Parse a profile from TOML text.
pub fn parse_profile(s: &str, origin: &Path) -> Result<Profile, AnalysisError> {
    let file: ProfileFile =
        toml::from_str(s).map_err(|e| AnalysisError::profile(origin, e.to_string()))?;
    for r in &file.rules {
        if r.key.trim().is_empty() || r.config_key.trim().is_empty() {
            return Err(AnalysisError::profile(
                origin,
                "every rule needs a non-empty key and config_key",
            ));
        }
    }
    Ok(Profile {
        rules: file.rules.into_iter().map(ActiveRule::from).collect(),
    })
}

/// Load a profile from disk.
///
/// A missing file yields an empty profile unless `required` is set, in which
/// case it is reported as an error.
pub fn load_profile(path: &Path, required: bool) -> Result<Profile, AnalysisError> {
    if !path.exists() {
        if required {
            return Err(AnalysisError::profile(path, "file not found"));
        }
        tracing::info!(path = %path.display(), "no profile found; no rules are active");
        return Ok(Profile::default());
    }
    let s = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_profile(&s, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_profile_defaults_and_params() {
        let p = parse_profile(
            r#"
[[rules]]
key = "EmptyClass"
config_key = "org.codenarc.rule.basic.EmptyClassRule"

[[rules]]
key = "MethodSize"
config_key = "org.codenarc.rule.size.MethodSizeRule"
severity = "critical"
repository = "custom"
[rules.params]
maxLines = "50"
            "#,
            Path::new("profile.toml"),
        )
        .unwrap();
        assert_eq!(p.rules.len(), 2);
        assert_eq!(p.rules[0].rule.to_string(), "codenarc:EmptyClass");
        assert_eq!(p.rules[0].name, "EmptyClass");
        assert_eq!(p.rules[0].severity, Severity::Major);
        assert_eq!(p.rules[1].rule.repository, "custom");
        assert_eq!(p.rules[1].severity, Severity::Critical);
        assert_eq!(p.rules[1].params.get("maxLines").map(String::as_str), Some("50"));
        assert_eq!(p.active_rules_by_repository(REPOSITORY_KEY).len(), 1);
    }

    #[test]
    fn test_parse_profile_rejects_blank_keys() {
        let err = parse_profile(
            "[[rules]]\nkey = \"\"\nconfig_key = \"x\"\n",
            Path::new("p.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Profile { .. }));
    }

    #[test]
    fn test_load_profile_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(load_profile(&path, false).unwrap().rules.is_empty());
        assert!(load_profile(&path, true).is_err());
    }
}
