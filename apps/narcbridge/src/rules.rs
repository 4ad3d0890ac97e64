//! Rule resolution: maps the rule key written by CodeNarc to an active rule
//! of the current profile.
//!
//! A violation can name its rule either by the CodeNarc class
//! (`org.codenarc.rule.basic.EmptyClassRule`) or by the short rule name
//! CodeNarc prints in its reports (`EmptyClass`). Both are compared
//! exactly; the first active rule in profile order wins.

use crate::models::{RuleRef, Severity};
use std::collections::BTreeMap;

/// Repository key for CodeNarc rules inside the host rule catalog.
pub const REPOSITORY_KEY: &str = "codenarc";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A rule enabled for the current analysis profile.
pub struct ActiveRule {
    pub rule: RuleRef,
    /// CodeNarc rule class, also used when exporting a ruleset.
    pub config_key: String,
    /// Rule name as it appears in CodeNarc reports.
    pub name: String,
    pub severity: Severity,
    pub params: BTreeMap<String, String>,
}

impl ActiveRule {
    pub fn new(rule: RuleRef, config_key: impl Into<String>) -> Self {
        let config_key = config_key.into();
        Self {
            rule,
            name: rule_name_from_class(&config_key),
            config_key,
            severity: Severity::default(),
            params: BTreeMap::new(),
        }
    }

    fn matches(&self, foreign_key: &str) -> bool {
        self.config_key == foreign_key || self.name == foreign_key
    }
}

/// Host view of the active rules, grouped by repository.
pub trait RuleProfile {
    fn active_rules_by_repository(&self, repository: &str) -> Vec<&ActiveRule>;
}

impl RuleProfile for Vec<ActiveRule> {
    fn active_rules_by_repository(&self, repository: &str) -> Vec<&ActiveRule> {
        self.iter()
            .filter(|r| r.rule.repository == repository)
            .collect()
    }
}

/// Derive the report rule name from a CodeNarc rule class:
/// `org.codenarc.rule.basic.EmptyClassRule` becomes `EmptyClass`.
pub fn rule_name_from_class(config_key: &str) -> String {
    let simple = config_key.rsplit('.').next().unwrap_or(config_key);
    match simple.strip_suffix("Rule") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => simple.to_string(),
    }
}

/// Exact-key lookup over the active rules of one run.
pub struct RuleResolver<'a> {
    rules: Vec<&'a ActiveRule>,
}

impl<'a> RuleResolver<'a> {
    pub fn new(rules: Vec<&'a ActiveRule>) -> Self {
        Self { rules }
    }

    /// Returns `None` when no active rule carries `foreign_key`.
    pub fn resolve(&self, foreign_key: &str) -> Option<&'a ActiveRule> {
        let found = self.rules.iter().copied().find(|r| r.matches(foreign_key));
        if found.is_none() {
            tracing::debug!(rule = foreign_key, "no active rule for violation");
        }
        found
    }
}
