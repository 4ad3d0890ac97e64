//! narcbridge CLI binary entry point.
//! Resolves configuration, runs the CodeNarc sensor and prints results.

use clap::Parser;
use narcbridge::cli::{Cli, Commands};
use narcbridge::config::{self, CliOverrides, Effective};
use narcbridge::discovery::ProjectFileSystem;
use narcbridge::error::AnalysisError;
use narcbridge::models::profile::load_profile;
use narcbridge::models::Issue;
use narcbridge::output;
use narcbridge::runner::CodeNarcCommand;
use narcbridge::sensor::{CodeNarcSensor, Outcome};
use tracing::level_filters::LevelFilter;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn analyze(eff: &Effective) -> Result<(Vec<Issue>, Outcome), AnalysisError> {
    let fs = ProjectFileSystem::scan(&eff.base_dir, &eff.main_dirs, &eff.test_dirs, &eff.suffixes)?;
    let profile = load_profile(&eff.profile, eff.profile_configured)?;
    let runner = CodeNarcCommand::from_words(&eff.command);
    let settings = eff.sensor_settings();
    let sensor = CodeNarcSensor::new(&settings, &fs, &profile, &runner);
    tracing::info!(sensor = %sensor, base_dir = %eff.base_dir.display(), "starting analysis");
    let mut issues: Vec<Issue> = Vec::new();
    let outcome = sensor.analyse(&mut issues)?;
    Ok((issues, outcome))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Analyze {
            base_dir,
            profile,
            report_path,
            source_dirs,
            work_dir,
            output,
            check,
        } => {
            let overrides = CliOverrides {
                base_dir,
                profile,
                report_path,
                source_dirs,
                work_dir,
                output,
            };
            let eff = match config::resolve_effective(&overrides) {
                Ok(eff) => eff,
                Err(e) => {
                    eprintln!("{} {}", output::error_prefix(), e);
                    std::process::exit(2);
                }
            };
            match analyze(&eff) {
                Ok((issues, outcome)) => {
                    output::print_analysis(&issues, &outcome, &eff.output);
                    if check && !issues.is_empty() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("{} {}", output::error_prefix(), e);
                    std::process::exit(2);
                }
            }
        }
    }
}
