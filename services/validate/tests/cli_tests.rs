//! Runs the validate binary against fixture repositories.

use std::fs;
use std::process::{Command, Output};

use test_utils::{EmissFixture, TestRepo, WrfFixture};

fn validate(repo: &TestRepo, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_validate"))
        .args(args)
        .env("QUICKLOOK_ROOT", repo.root())
        .env("RUST_LOG", "warn")
        .current_dir(repo.root())
        .output()
        .unwrap()
}

fn report_json(repo: &TestRepo) -> serde_json::Value {
    let text = fs::read_to_string(repo.outputs_dir().join("validation_report.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_clean_repo_passes() {
    let repo = TestRepo::new();
    let output = validate(&repo, &[]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));

    let json = report_json(&repo);
    assert_eq!(json["failed"], 0);
    let types: Vec<_> = json["reports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["dataset_type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, vec!["boundary", "emiss", "flexpart", "wrf", "grid_compatibility"]);
}

#[test]
fn test_mismatch_fails_with_report() {
    let wrf = WrfFixture {
        south_north: 7,
        ..WrfFixture::default()
    };
    let repo = TestRepo::with_fixtures(wrf, EmissFixture::default());
    let output = validate(&repo, &["--dataset", "wrf"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[FAIL] wrf dim:south_north: expected 6, found 7"));

    let json = report_json(&repo);
    assert!(json["failed"].as_u64().unwrap() >= 1);
}

#[test]
fn test_dataset_filter_skips_grid_check() {
    let repo = TestRepo::new();
    let output = validate(&repo, &["--dataset", "boundary"]);
    assert!(output.status.success());

    let json = report_json(&repo);
    assert_eq!(json["reports"].as_array().unwrap().len(), 1);
    assert_eq!(json["reports"][0]["dataset_type"], "boundary");
}

#[test]
fn test_broken_config_exit_code() {
    let repo = TestRepo::new();
    fs::write(repo.config_path(), "datasets: {}\n").unwrap();
    let output = validate(&repo, &[]);
    assert_eq!(output.status.code(), Some(2));
}
