//! Output rendering for the analyze command.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-issue fields, the run status, and a top-level summary.

use crate::models::{Issue, Severity};
use crate::sensor::Outcome;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Prefix for fatal errors printed to stderr.
pub fn error_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_some() {
        "error:".to_string()
    } else {
        "error:".red().bold().to_string()
    }
}

fn location(is: &Issue) -> String {
    match is.line {
        Some(l) => format!("{}:{}", is.file, l),
        None => is.file.clone(),
    }
}

/// Print analysis results in the requested format.
pub fn print_analysis(issues: &[Issue], outcome: &Outcome, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_analysis_json(issues, outcome))
                .unwrap_or_else(|_| "{}".to_string())
        ),
        _ => {
            let color = use_colors(output);
            if let Outcome::Skipped = outcome {
                let note = "— Skipped — no active CodeNarc rules or no Groovy sources";
                if color {
                    println!("{}", note.bright_black());
                } else {
                    println!("{}", note);
                }
                return;
            }
            for is in issues {
                let tag = format!("⟦{}⟧", is.severity);
                let (icon, sev) = match is.severity {
                    Severity::Blocker | Severity::Critical => {
                        ("✖".red().to_string(), tag.red().bold().to_string())
                    }
                    Severity::Major => ("▲".yellow().to_string(), tag.yellow().bold().to_string()),
                    Severity::Minor | Severity::Info => {
                        ("◆".blue().to_string(), tag.blue().bold().to_string())
                    }
                };
                let loc = location(is);
                if color {
                    println!("{} {} {} ❲{}❳ — {}", icon, sev, loc.bold(), is.rule, is.message);
                } else {
                    println!("{} {} ❲{}❳ — {}", tag, loc, is.rule, is.message);
                }
            }
            let s = outcome.summary();
            let summary = format!(
                "— Summary — violations={} issues={} unknown_rules={} unknown_files={} unattached={}",
                s.violations, s.issues, s.unknown_rules, s.unknown_files, s.unattached
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Compose analysis JSON object (pure) for testing/snapshot purposes.
pub fn compose_analysis_json(issues: &[Issue], outcome: &Outcome) -> JsonVal {
    let status = match outcome {
        Outcome::Skipped => "skipped",
        Outcome::Completed(_) => "completed",
    };
    let items: Vec<_> = issues
        .iter()
        .map(|is| {
            json!({
                "rule": is.rule.to_string(),
                "severity": is.severity,
                "file": is.file,
                "line": is.line,
                "message": is.message,
            })
        })
        .collect();
    json!({
        "status": status,
        "issues": items,
        "summary": outcome.summary(),
    })
}
