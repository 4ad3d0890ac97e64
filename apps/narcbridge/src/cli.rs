//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "narcbridge",
    version,
    about = "Run CodeNarc over Groovy sources and map its findings to issues",
    long_about = "narcbridge — runs CodeNarc (or reads an existing CodeNarc XML report), resolves every violation to an active rule and a tracked source file, and reports the resulting issues.\n\nConfiguration precedence: CLI > narcbridge.toml > defaults.",
    after_help = "Examples:\n  narcbridge analyze\n  narcbridge analyze --report-path build/reports/codenarc/main.xml --output json\n  narcbridge analyze --source-dir src --profile quality/profile.toml --check",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current narcbridge version.")]
    Version,
    /// Analyze Groovy sources with CodeNarc
    #[command(
        about = "Run the CodeNarc analysis",
        long_about = "Run CodeNarc over the source directories, or read the configured report, and print one issue per violation that maps to an active rule and a tracked file.",
        after_help = "Examples:\n  narcbridge analyze --output json\n  narcbridge analyze --report-path target/CodeNarcReport.xml"
    )]
    Analyze {
        #[arg(long, help = "Project base directory (default: current dir)")]
        base_dir: Option<String>,
        #[arg(long, help = "Quality profile TOML listing active rules")]
        profile: Option<String>,
        #[arg(long, help = "Existing CodeNarc XML report; skips running CodeNarc")]
        report_path: Option<String>,
        #[arg(long = "source-dir", help = "Source directory to analyze (repeatable)")]
        source_dirs: Vec<String>,
        #[arg(long, help = "Working directory for the ruleset and generated report")]
        work_dir: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any issue is reported")]
        check: bool,
    },
}
