//! Checks of dataset samples against their declared schema.

use netcdf_parser::{open_dataset, ArrayHandle};
use path_registry::{AttrExpectation, DatasetFormat, DatasetSpec, Resolver};
use quicklook_common::AttrValue;
use tracing::{debug, info, warn};

use crate::report::ValidationReport;

/// Runs schema checks for the datasets declared in a [`Resolver`]'s
/// configuration. Holds no state between runs.
pub struct Validator<'a> {
    resolver: &'a Resolver,
}

impl<'a> Validator<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        self.resolver
    }

    /// Validate every declared dataset, in name order.
    pub fn validate_all(&self) -> Vec<ValidationReport> {
        self.resolver
            .config()
            .dataset_names()
            .map(|name| self.validate(name))
            .collect()
    }

    /// Validate one dataset.
    ///
    /// Every declared check produces an entry. When the sample cannot be
    /// resolved or opened, the checks that need it are recorded as failed
    /// with "not checked"; file checks still run.
    pub fn validate(&self, dataset_type: &str) -> ValidationReport {
        let mut report = ValidationReport::new(dataset_type);

        let spec = match self.resolver.dataset(dataset_type) {
            Ok(spec) => spec,
            Err(e) => {
                report.fail("declared", e.to_string());
                return report;
            }
        };

        let sample_checks = sample_check_names(spec);

        match self.resolver.resolve_sample(dataset_type) {
            Ok(resolved) => {
                report.pass("resolve", resolved.path().display().to_string());
                if spec.format == DatasetFormat::Netcdf {
                    match open_dataset(resolved.path()) {
                        Ok(handle) => {
                            report.pass("open", "opened read-only");
                            check_schema(&mut report, spec, &handle);
                        }
                        Err(e) => {
                            report.fail("open", e.to_string());
                            report.skip_all(sample_checks);
                        }
                    }
                }
            }
            Err(e) => {
                report.fail("resolve", format!("{}: {}", e.kind(), e));
                if spec.format == DatasetFormat::Netcdf {
                    report.skip_all(std::iter::once("open".to_string()).chain(sample_checks));
                }
            }
        }

        self.check_files(&mut report, dataset_type, spec);

        let failed = report.failures().count();
        if failed == 0 {
            info!(dataset = dataset_type, checks = report.entries.len(), "Validation passed");
        } else {
            warn!(dataset = dataset_type, failed, "Validation failed");
        }
        report
    }

    fn check_files(&self, report: &mut ValidationReport, dataset_type: &str, spec: &DatasetSpec) {
        let checks = spec.files.iter().map(|f| format!("file:{}", f));
        let root = match self.resolver.dataset_root(dataset_type) {
            Ok(root) => root,
            Err(_) => {
                report.skip_all(checks);
                return;
            }
        };

        for (check, file) in checks.zip(&spec.files) {
            let path = root.join(file);
            if path.exists() {
                report.pass(check, path.display().to_string());
            } else {
                report.fail(check, format!("missing: {}", path.display()));
            }
        }
    }
}

/// Names of the checks that need the opened sample, in report order.
fn sample_check_names(spec: &DatasetSpec) -> Vec<String> {
    let schema = &spec.schema;
    schema
        .dims
        .keys()
        .map(|d| format!("dim:{}", d))
        .chain(schema.variables.iter().map(|v| format!("var:{}", v)))
        .chain(schema.attributes.keys().map(|a| format!("attr:{}", a)))
        .collect()
}

fn check_schema(report: &mut ValidationReport, spec: &DatasetSpec, handle: &ArrayHandle) {
    let schema = &spec.schema;

    for (name, expected) in &schema.dims {
        let check = format!("dim:{}", name);
        match handle.dimension_len(name) {
            Some(len) if expected.accepts(len) => report.pass(check, format!("length {}", len)),
            Some(len) => report.fail(check, format!("expected {}, found {}", expected, len)),
            None => report.fail(check, "missing"),
        }
    }

    for name in &schema.variables {
        let check = format!("var:{}", name);
        if handle.has_variable(name) {
            report.pass(check, "present");
        } else {
            report.fail(check, "missing");
        }
    }

    for (key, expectation) in &schema.attributes {
        let found = lookup_attribute(handle, key);
        let check = format!("attr:{}", key);
        match check_attribute(expectation, found.as_ref()) {
            Ok(detail) => report.pass(check, detail),
            Err(detail) => report.fail(check, detail),
        }
    }

    debug!(path = %handle.path().display(), "Schema checks done");
}

/// `VAR:attr` names a variable attribute; anything else a global one.
fn lookup_attribute(handle: &ArrayHandle, key: &str) -> Option<AttrValue> {
    match key.split_once(':') {
        Some((var, attr)) => handle
            .variable(var)
            .ok()
            .and_then(|info| info.attributes.get(attr).cloned()),
        None => handle.global_attribute(key),
    }
}

/// Compare an attribute against its expectation. `Ok` and `Err` both carry
/// the report detail.
pub fn check_attribute(
    expectation: &AttrExpectation,
    found: Option<&AttrValue>,
) -> Result<String, String> {
    let Some(value) = found else {
        return Err("missing".to_string());
    };

    match expectation {
        AttrExpectation::Presence => Ok(format!("present ({})", value)),
        AttrExpectation::Exact(expected) if value.matches(expected) => Ok(format!("= {}", value)),
        AttrExpectation::Exact(expected) => Err(format!("expected {}, found {}", expected, value)),
        AttrExpectation::TypeOnly(kind) if value.is_kind(*kind) => Ok(format!("{} ({})", kind, value)),
        AttrExpectation::TypeOnly(kind) => {
            Err(format!("expected {}, found {} ({})", kind, value.kind(), value))
        }
    }
}
