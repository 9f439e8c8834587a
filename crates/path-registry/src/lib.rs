//! Dataset path configuration and sample manifest resolution.
//!
//! A [`Resolver`] combines `important_paths.yaml` (dataset roots and schema
//! expectations) with `samples/manifest.tsv` (concrete sample files) and
//! turns a logical request such as "the WRF sample" into an existing
//! absolute path.

pub mod config;
pub mod env;
pub mod manifest;
pub mod resolver;

pub use config::{
    AttrExpectation, DatasetFormat, DatasetSpec, DimExpectation, LengthClass, PathsConfig, Schema,
    CONFIG_FILE,
};
pub use env::expand_env_vars;
pub use manifest::{Manifest, ManifestEntry};
pub use resolver::{ResolvedPath, Resolver, ROOT_ENV};
