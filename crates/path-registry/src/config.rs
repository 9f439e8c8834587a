//! The `important_paths.yaml` configuration document.
//!
//! ```yaml
//! manifest: samples/manifest.tsv
//! outputs_dir: outputs
//! datasets:
//!   wrf:
//!     root: ${NAFA_DATA:-data}/wrf
//!     schema:
//!       dims: { Time: nonzero, south_north: 199 }
//!       variables: [U10, V10]
//!       attributes:
//!         MAP_PROJ: { exact: 1 }
//!         DX: { type: float }
//!         TITLE: present
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use quicklook_common::{AttrKind, AttrValue, QuicklookError, QuicklookResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::expand_env_vars;

/// File name of the configuration document at the repository root.
pub const CONFIG_FILE: &str = "important_paths.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Manifest location, relative to the repository root unless absolute.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Where quicklook images and reports are written.
    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: PathBuf,

    pub datasets: BTreeMap<String, DatasetSpec>,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("samples/manifest.tsv")
}

fn default_outputs_dir() -> PathBuf {
    PathBuf::from("outputs")
}

/// One declared dataset type.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSpec {
    pub root: PathBuf,

    #[serde(default)]
    pub format: DatasetFormat,

    /// Manifest role of the file the validator opens.
    #[serde(default = "default_sample_role")]
    pub sample_role: String,

    #[serde(default)]
    pub schema: Schema,

    /// Files expected under `root`, relative to it.
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,
}

fn default_sample_role() -> String {
    "sample".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    #[default]
    Netcdf,
    /// Plain files; only presence is checked.
    Text,
}

/// Expected structure of a dataset's sample file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub dims: BTreeMap<String, DimExpectation>,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrExpectation>,
}

impl Schema {
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty() && self.variables.is_empty() && self.attributes.is_empty()
    }
}

/// Expected length of a dimension: an exact number or `nonzero`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DimExpectation {
    Exact(usize),
    Class(LengthClass),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthClass {
    Nonzero,
}

impl DimExpectation {
    pub fn accepts(&self, len: usize) -> bool {
        match self {
            DimExpectation::Exact(n) => len == *n,
            DimExpectation::Class(LengthClass::Nonzero) => len > 0,
        }
    }
}

impl fmt::Display for DimExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimExpectation::Exact(n) => write!(f, "{}", n),
            DimExpectation::Class(LengthClass::Nonzero) => f.write_str("non-zero"),
        }
    }
}

/// What a declared attribute must satisfy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAttrExpectation")]
pub enum AttrExpectation {
    /// `{ exact: <value> }`
    Exact(AttrValue),
    /// `{ type: int|float|number|text|list }`
    TypeOnly(AttrKind),
    /// `present`
    Presence,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAttrExpectation {
    Exact {
        exact: AttrValue,
    },
    TypeOnly {
        #[serde(rename = "type")]
        kind: AttrKind,
    },
    Presence(PresenceMarker),
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum PresenceMarker {
    Present,
}

impl From<RawAttrExpectation> for AttrExpectation {
    fn from(raw: RawAttrExpectation) -> Self {
        match raw {
            RawAttrExpectation::Exact { exact } => AttrExpectation::Exact(exact),
            RawAttrExpectation::TypeOnly { kind } => AttrExpectation::TypeOnly(kind),
            RawAttrExpectation::Presence(PresenceMarker::Present) => AttrExpectation::Presence,
        }
    }
}

impl fmt::Display for AttrExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrExpectation::Exact(v) => write!(f, "= {}", v),
            AttrExpectation::TypeOnly(k) => write!(f, "of type {}", k),
            AttrExpectation::Presence => f.write_str("present"),
        }
    }
}

impl PathsConfig {
    /// Load, expand environment references, parse and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> QuicklookResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            QuicklookError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&content)?;
        debug!(
            path = %path.display(),
            datasets = config.datasets.len(),
            "Loaded path configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> QuicklookResult<Self> {
        let expanded = expand_env_vars(content)?;
        let config: PathsConfig = serde_yaml::from_str(&expanded).map_err(|e| {
            QuicklookError::config(format!("Failed to parse {}: {}", CONFIG_FILE, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetSpec> {
        self.datasets.get(name)
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    fn validate(&self) -> QuicklookResult<()> {
        if self.datasets.is_empty() {
            return Err(QuicklookError::config(format!(
                "{} declares no datasets",
                CONFIG_FILE
            )));
        }

        for (name, spec) in &self.datasets {
            if name.trim().is_empty() {
                return Err(QuicklookError::config("Dataset name cannot be empty"));
            }
            if spec.root.as_os_str().is_empty() {
                return Err(QuicklookError::config(format!(
                    "Dataset '{}' has an empty root",
                    name
                )));
            }
            if spec.sample_role.trim().is_empty() {
                return Err(QuicklookError::config(format!(
                    "Dataset '{}' has an empty sample_role",
                    name
                )));
            }
            if spec.format == DatasetFormat::Text && !spec.schema.is_empty() {
                return Err(QuicklookError::config(format!(
                    "Dataset '{}' is text and cannot declare dims, variables or attributes",
                    name
                )));
            }
        }

        Ok(())
    }
}
