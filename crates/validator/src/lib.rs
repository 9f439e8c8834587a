//! Dataset validation.
//!
//! [`Validator::validate`] resolves a dataset's sample through the
//! [`path_registry::Resolver`], opens it, and checks declared dimensions,
//! variables, attributes and files. Reports are exhaustive: every declared
//! check yields an entry, whatever failed before it.

pub mod grid_compat;
pub mod report;
pub mod schema;

pub use grid_compat::{grid_compatibility, GridTolerances, GRID_COMPAT_REPORT};
pub use report::{CheckResult, ValidationReport, ValidationSummary};
pub use schema::{check_attribute, Validator};
