//! Validation runner
//!
//! Checks every declared dataset sample (or the ones named with
//! `--dataset`) plus WRF/emissions grid compatibility, prints one line per
//! check and writes `<outputs_dir>/validation_report.json`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use path_registry::Resolver;
use quicklook_common::QuicklookError;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use validator::{GridTolerances, ValidationReport, ValidationSummary, Validator};

const REPORT_FILE: &str = "validation_report.json";

#[derive(Parser, Debug)]
#[command(name = "validate")]
#[command(about = "Validate dataset samples against important_paths.yaml")]
struct Args {
    /// Only validate this dataset type (repeatable)
    #[arg(long = "dataset", value_name = "TYPE")]
    datasets: Vec<String>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match execute(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            let code = err
                .downcast_ref::<QuicklookError>()
                .map(QuicklookError::exit_code)
                .unwrap_or(1);
            error!(code, "{:#}", err);
            ExitCode::from(code)
        }
    }
}

/// Returns whether every check passed.
fn execute(args: &Args) -> anyhow::Result<bool> {
    let resolver = Resolver::discover()?;
    let validator = Validator::new(&resolver);

    let mut reports: Vec<ValidationReport> = if args.datasets.is_empty() {
        validator.validate_all()
    } else {
        args.datasets.iter().map(|d| validator.validate(d)).collect()
    };

    if wants_grid_check(&args.datasets) {
        reports.push(validator.grid_compatibility(GridTolerances::default()));
    }

    for report in &reports {
        for entry in &report.entries {
            let status = if entry.passed { "PASS" } else { "FAIL" };
            println!("[{}] {} {}: {}", status, report.dataset_type, entry.check, entry.detail);
        }
    }

    let summary = ValidationSummary::from_reports(reports);
    let path = write_summary(&resolver, &summary)?;
    println!(
        "{} checks, {} passed, {} failed. Report: {}",
        summary.total_checks,
        summary.passed,
        summary.failed,
        path.display()
    );
    info!(passed = summary.passed, failed = summary.failed, "Validation finished");

    Ok(summary.all_passed())
}

/// Grid compatibility runs with no filter, or when the filter names either
/// side of the comparison.
fn wants_grid_check(datasets: &[String]) -> bool {
    datasets.is_empty() || datasets.iter().any(|d| d == "wrf" || d == "emiss")
}

fn write_summary(resolver: &Resolver, summary: &ValidationSummary) -> anyhow::Result<PathBuf> {
    let dir = resolver.outputs_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(REPORT_FILE);
    let json = summary.to_json().context("serializing validation report")?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
