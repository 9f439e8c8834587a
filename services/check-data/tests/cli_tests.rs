//! Runs the check-data binary against fixture repositories.

use std::fs;
use std::process::{Command, Output};

use test_utils::TestRepo;

fn check_data(repo: &TestRepo, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_check-data"))
        .args(args)
        .env("QUICKLOOK_ROOT", repo.root())
        .env("RUST_LOG", "warn")
        .current_dir(repo.root())
        .output()
        .unwrap()
}

#[test]
fn test_summary_sections() {
    let repo = TestRepo::new();
    let output = check_data(&repo, &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for section in ["[Paths]", "[WRF]", "[Emissions]", "[Boundaries]", "[FLEXPART runs]", "Done."] {
        assert!(stdout.contains(section), "missing {section} in:\n{stdout}");
    }
    assert!(stdout.contains("south_north=6"));
    assert!(stdout.contains("attr GDTYP: "));
    assert!(stdout.contains("file: Fairbanks.txt"));
    assert!(stdout.contains("boundaries: 1"));
    assert!(stdout.contains("  points: 5"));
    assert!(stdout.contains("subdirs: run_001"));
    assert!(stdout.contains("run_001/header_txt"));
    assert!(!repo.outputs_dir().join("sample_checksums.tsv").exists());
}

#[test]
fn test_summary_survives_corrupt_sample() {
    let repo = TestRepo::new();
    repo.corrupt(&repo.wrf_path());
    let output = check_data(&repo, &[]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ERROR opening"));
}

#[test]
fn test_summary_reports_unreadable_boundary() {
    let repo = TestRepo::new();
    fs::write(
        repo.root().join("data/boundaries/Broken.txt"),
        "h1\nh2\n-150.0,north,0\n",
    )
    .unwrap();
    let output = check_data(&repo, &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR reading"));
    assert!(stdout.contains("[FLEXPART runs]"));
}

#[test]
fn test_checksums_mark_missing_files() {
    let repo = TestRepo::new();
    fs::remove_file(repo.emiss_path()).unwrap();
    let output = check_data(&repo, &["--checksums"]);
    assert!(output.status.success());

    let tsv = fs::read_to_string(repo.outputs_dir().join("sample_checksums.tsv")).unwrap();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines[0], "dataset\trole\tfilepath\tnote\tsha256");
    assert_eq!(lines.len(), 1 + 5);

    let emiss = lines.iter().find(|l| l.starts_with("emiss\t")).unwrap();
    assert!(emiss.ends_with("\tMISSING"));

    let wrf = lines.iter().find(|l| l.starts_with("wrf\t")).unwrap();
    let digest = wrf.rsplit('\t').next().unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}
