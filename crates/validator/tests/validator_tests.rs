//! Validation against a temporary repository.

use netcdf_parser::open_dataset;
use path_registry::Resolver;
use test_utils::{write_emiss_fixture, EmissFixture, TestRepo, WrfFixture};
use validator::{grid_compatibility, GridTolerances, Validator};

#[test]
fn test_fixture_repository_validates_cleanly() {
    let repo = TestRepo::new();
    let resolver = Resolver::load(repo.root()).unwrap();
    let validator = Validator::new(&resolver);

    for report in validator.validate_all() {
        let failures: Vec<_> = report.failures().collect();
        assert!(failures.is_empty(), "{}: {:?}", report.dataset_type, failures);
    }
}

#[test]
fn test_report_is_exhaustive_after_open_failure() {
    let repo = TestRepo::new();
    repo.corrupt(&repo.wrf_path());
    let resolver = Resolver::load(repo.root()).unwrap();

    let report = Validator::new(&resolver).validate("wrf");
    assert!(!report.passed());

    let checks: Vec<_> = report.entries.iter().map(|e| e.check.as_str()).collect();
    assert_eq!(checks[0], "resolve");
    assert_eq!(checks[1], "open");
    // 3 dims + 4 variables + 4 attributes, all recorded
    for name in ["dim:Time", "var:XLONG", "attr:TITLE"] {
        let entry = report.entries.iter().find(|e| e.check == name).unwrap();
        assert!(!entry.passed);
        assert_eq!(entry.detail, "not checked");
    }
    assert_eq!(report.entries.len(), 2 + 3 + 4 + 4);
}

#[test]
fn test_missing_manifest_row_is_reported_not_raised() {
    let repo = TestRepo::new();
    repo.drop_manifest_rows("emiss");
    let resolver = Resolver::load(repo.root()).unwrap();

    let report = Validator::new(&resolver).validate("emiss");
    let resolve = &report.entries[0];
    assert_eq!(resolve.check, "resolve");
    assert!(!resolve.passed);
    assert!(resolve.detail.starts_with("ManifestLookupError"));
    assert_eq!(report.failures().count(), report.entries.len());
}

#[test]
fn test_mismatches_are_all_collected() {
    // Wrong row count and no coordinates: two dims/vars checks fail, the
    // rest still run.
    let repo = TestRepo::with_fixtures(
        WrfFixture {
            south_north: 7,
            with_coords: false,
            ..WrfFixture::default()
        },
        EmissFixture::default(),
    );
    let resolver = Resolver::load(repo.root()).unwrap();
    let report = Validator::new(&resolver).validate("wrf");

    let failed: Vec<_> = report.failures().map(|e| e.check.as_str()).collect();
    assert_eq!(failed, vec!["dim:south_north", "var:XLAT", "var:XLONG"]);

    let dim = report.entries.iter().find(|e| e.check == "dim:south_north").unwrap();
    assert_eq!(dim.detail, "expected 6, found 7");
}

#[test]
fn test_text_dataset_checks_files_only() {
    let repo = TestRepo::new();
    let resolver = Resolver::load(repo.root()).unwrap();
    let report = Validator::new(&resolver).validate("boundary");

    let checks: Vec<_> = report.entries.iter().map(|e| e.check.as_str()).collect();
    assert_eq!(checks, vec!["resolve", "file:Fairbanks.txt"]);
    assert!(report.passed());
}

#[test]
fn test_undeclared_dataset() {
    let repo = TestRepo::new();
    let resolver = Resolver::load(repo.root()).unwrap();
    let report = Validator::new(&resolver).validate("chemistry");
    assert_eq!(report.entries.len(), 1);
    assert!(!report.passed());
}

#[test]
fn test_validation_is_idempotent() {
    let repo = TestRepo::new();
    repo.corrupt(&repo.emiss_path());
    let resolver = Resolver::load(repo.root()).unwrap();
    let validator = Validator::new(&resolver);

    let first = validator.validate_all();
    let second = validator.validate_all();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.outcomes(), b.outcomes());
    }
}

#[test]
fn test_grid_compatibility_of_fixtures() {
    let repo = TestRepo::new();
    let resolver = Resolver::load(repo.root()).unwrap();
    let report = Validator::new(&resolver).grid_compatibility(GridTolerances::default());
    assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.entries.len(), 7);
}

#[test]
fn test_grid_compatibility_flags_large_differences() {
    let repo = TestRepo::new();
    let other = repo.root().join("wide.nc");
    write_emiss_fixture(
        &other,
        EmissFixture {
            cols: 20,
            ..EmissFixture::default()
        },
    )
    .unwrap();

    let wrf = open_dataset(repo.wrf_path()).unwrap();
    let emiss = open_dataset(&other).unwrap();
    let report = grid_compatibility(&wrf, &emiss, GridTolerances::default());

    let failed: Vec<_> = report.failures().map(|e| e.check.as_str()).collect();
    assert_eq!(failed, vec!["west_east~NCOLS"]);
}
