//! Validation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// e.g. `dim:Time`, `var:U10`, `attr:MAP_PROJ`, `file:Fairbanks.txt`
    pub check: String,
    pub passed: bool,
    pub detail: String,
}

/// Ordered check results for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub dataset_type: String,
    pub entries: Vec<CheckResult>,
}

pub(crate) const NOT_CHECKED: &str = "not checked";

impl ValidationReport {
    pub fn new(dataset_type: impl Into<String>) -> Self {
        Self {
            dataset_type: dataset_type.into(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, check: impl Into<String>, passed: bool, detail: impl Into<String>) {
        self.entries.push(CheckResult {
            check: check.into(),
            passed,
            detail: detail.into(),
        });
    }

    pub(crate) fn pass(&mut self, check: impl Into<String>, detail: impl Into<String>) {
        self.record(check, true, detail);
    }

    pub(crate) fn fail(&mut self, check: impl Into<String>, detail: impl Into<String>) {
        self.record(check, false, detail);
    }

    /// Record each check as failed because an earlier step did not succeed.
    pub(crate) fn skip_all<I, S>(&mut self, checks: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for check in checks {
            self.fail(check, NOT_CHECKED);
        }
    }

    /// True when every entry passed. An empty report passes.
    pub fn passed(&self) -> bool {
        self.entries.iter().all(|e| e.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.entries.iter().filter(|e| !e.passed)
    }

    /// `(check, passed)` pairs, for comparing two runs.
    pub fn outcomes(&self) -> Vec<(&str, bool)> {
        self.entries
            .iter()
            .map(|e| (e.check.as_str(), e.passed))
            .collect()
    }
}

/// Every report of one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub generated_at: DateTime<Utc>,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub reports: Vec<ValidationReport>,
}

impl ValidationSummary {
    pub fn from_reports(reports: Vec<ValidationReport>) -> Self {
        let total_checks = reports.iter().map(|r| r.entries.len()).sum();
        let failed = reports.iter().map(|r| r.failures().count()).sum();
        Self {
            generated_at: Utc::now(),
            total_checks,
            passed: total_checks - failed,
            failed,
            reports,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
