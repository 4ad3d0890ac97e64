//! Issue emission into the host sink.

use crate::files::InputFile;
use crate::models::Issue;
use crate::rules::ActiveRule;

/// Host sink accepting finalized issues one at a time.
pub trait IssueSink {
    /// Whether the host can attach issues to `file`.
    fn accepts(&self, _file: &InputFile) -> bool {
        true
    }

    fn accept(&mut self, issue: Issue);
}

impl IssueSink for Vec<Issue> {
    fn accept(&mut self, issue: Issue) {
        self.push(issue);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happened to one violation.
pub enum Emission {
    Emitted,
    UnknownRule,
    UnknownFile,
    /// Both resolved, but the sink cannot carry issues for the file.
    Unattached,
}

/// Build and hand over one issue when both rule and file resolved.
///
/// Never deduplicates: two identical violations produce two issues.
pub fn emit(
    sink: &mut dyn IssueSink,
    rule: Option<&ActiveRule>,
    file: Option<&InputFile>,
    line: Option<u32>,
    message: &str,
) -> Emission {
    let Some(rule) = rule else {
        return Emission::UnknownRule;
    };
    let Some(file) = file else {
        return Emission::UnknownFile;
    };
    if !sink.accepts(file) {
        tracing::debug!(file = %file.relative_path, "sink does not accept issues for file");
        return Emission::Unattached;
    }
    let message = if message.trim().is_empty() {
        rule.name.clone()
    } else {
        message.to_string()
    };
    sink.accept(Issue {
        rule: rule.rule.clone(),
        severity: rule.severity,
        file: file.relative_path.clone(),
        absolute_path: file.absolute_path.clone(),
        line,
        message,
    });
    Emission::Emitted
}
