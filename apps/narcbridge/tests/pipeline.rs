use narcbridge::config::{resolve_effective, CliOverrides};
use narcbridge::discovery::ProjectFileSystem;
use narcbridge::models::profile::load_profile;
use narcbridge::models::{Issue, Severity};
use narcbridge::output::compose_analysis_json;
use narcbridge::runner::CodeNarcCommand;
use narcbridge::{CodeNarcSensor, Outcome};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const PROFILE: &str = r#"
[[rules]]
key = "EmptyClass"
config_key = "org.codenarc.rule.basic.EmptyClassRule"
severity = "minor"

[[rules]]
key = "UnusedImport"
config_key = "org.codenarc.rule.imports.UnusedImportRule"

[[rules]]
key = "ClassSize"
config_key = "org.codenarc.rule.size.ClassSizeRule"
severity = "critical"
[rules.params]
maxLines = "350"
"#;

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn project(root: &Path) {
    write(
        &root.join("narcbridge.toml"),
        "profile = \"quality/profile.toml\"\n\n[codenarc]\nreportPath = \"build/codenarc.xml\"\n",
    );
    write(&root.join("quality/profile.toml"), PROFILE);
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.xml");
    write(
        &root.join("build/codenarc.xml"),
        &fs::read_to_string(fixture).unwrap(),
    );
    write(&root.join("src/main/groovy/Bootstrap.groovy"), "class Bootstrap {}\n");
    write(
        &root.join("src/main/groovy/org/example/domain/Account.groovy"),
        "package org.example.domain\n",
    );
}

fn run(root: &Path) -> (Vec<Issue>, Outcome) {
    let eff = resolve_effective(&CliOverrides {
        base_dir: root.to_str().map(str::to_string),
        ..CliOverrides::default()
    })
    .unwrap();
    let fs = ProjectFileSystem::scan(&eff.base_dir, &eff.main_dirs, &eff.test_dirs, &eff.suffixes)
        .unwrap();
    let profile = load_profile(&eff.profile, eff.profile_configured).unwrap();
    // never invoked: the configured report is read instead
    let runner = CodeNarcCommand::from_words(&["narcbridge-missing-binary".to_string()]);
    let settings = eff.sensor_settings();
    let sensor = CodeNarcSensor::new(&settings, &fs, &profile, &runner);
    let mut issues = Vec::new();
    let outcome = sensor.analyse(&mut issues).unwrap();
    (issues, outcome)
}

#[test]
fn test_configured_report_maps_to_issues() {
    let dir = tempdir().unwrap();
    project(dir.path());
    let (issues, outcome) = run(dir.path());

    let summary = outcome.summary();
    assert_eq!(summary.violations, 4);
    assert_eq!(summary.issues, 3);
    assert_eq!(summary.unknown_rules, 1);
    assert_eq!(summary.unknown_files, 0);

    let keys: Vec<String> = issues.iter().map(|i| i.rule.to_string()).collect();
    assert_eq!(
        keys,
        vec!["codenarc:EmptyClass", "codenarc:UnusedImport", "codenarc:ClassSize"]
    );
    assert_eq!(issues[0].file, "Bootstrap.groovy");
    assert_eq!(issues[0].line, Some(1));
    assert_eq!(issues[0].severity, Severity::Minor);
    assert_eq!(issues[1].file, "org/example/domain/Account.groovy");
    assert_eq!(issues[1].severity, Severity::Major);
    assert_eq!(issues[2].line, None);
    assert_eq!(issues[2].severity, Severity::Critical);
    assert!(issues[2].message.contains("412 lines & exceeds"));
}

#[test]
fn test_report_relative_to_project_root_resolves() {
    let dir = tempdir().unwrap();
    project(dir.path());
    let report = dir.path().join("build/codenarc.xml");
    let rooted = fs::read_to_string(&report)
        .unwrap()
        .replace("path=''", "path='src/main/groovy'")
        .replace("path='org/example/domain'", "path='src/main/groovy/org/example/domain'");
    fs::write(&report, rooted).unwrap();
    let (issues, outcome) = run(dir.path());
    assert_eq!(outcome.summary().issues, 3);
    assert_eq!(outcome.summary().unknown_files, 0);
    assert_eq!(issues[0].file, "Bootstrap.groovy");
    assert_eq!(issues[1].file, "org/example/domain/Account.groovy");
}

#[test]
fn test_missing_source_file_counts_as_unknown() {
    let dir = tempdir().unwrap();
    project(dir.path());
    fs::remove_file(dir.path().join("src/main/groovy/Bootstrap.groovy")).unwrap();
    let (issues, outcome) = run(dir.path());
    assert_eq!(issues.len(), 2);
    assert_eq!(outcome.summary().unknown_files, 1);
}

#[test]
fn test_empty_profile_skips_analysis() {
    let dir = tempdir().unwrap();
    project(dir.path());
    fs::write(dir.path().join("quality/profile.toml"), "").unwrap();
    let (issues, outcome) = run(dir.path());
    assert!(issues.is_empty());
    assert!(matches!(outcome, Outcome::Skipped));
    assert_eq!(compose_analysis_json(&issues, &outcome)["status"], "skipped");
}

#[test]
fn test_missing_configured_profile_is_an_error() {
    let dir = tempdir().unwrap();
    project(dir.path());
    fs::remove_file(dir.path().join("quality/profile.toml")).unwrap();
    let eff = resolve_effective(&CliOverrides {
        base_dir: dir.path().to_str().map(str::to_string),
        ..CliOverrides::default()
    })
    .unwrap();
    assert!(load_profile(&eff.profile, eff.profile_configured).is_err());
}
