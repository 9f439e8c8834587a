//! Resolution of `(dataset_type, role)` to files on disk.

use std::path::{Path, PathBuf};

use quicklook_common::{QuicklookError, QuicklookResult};
use tracing::{debug, instrument};

use crate::config::{DatasetSpec, PathsConfig, CONFIG_FILE};
use crate::manifest::Manifest;

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "QUICKLOOK_ROOT";

/// An absolute path that existed when it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub dataset_type: String,
    pub role: String,
    path: PathBuf,
}

impl ResolvedPath {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Configuration plus manifest, anchored at a repository root.
///
/// Constructed once per process and passed to whatever needs paths.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    config: PathsConfig,
    manifest: Manifest,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>, config: PathsConfig, manifest: Manifest) -> Self {
        Self {
            root: root.into(),
            config,
            manifest,
        }
    }

    /// Read `important_paths.yaml` and the manifest it names from `root`.
    #[instrument(level = "debug", skip_all, fields(root = %root.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(root: P) -> QuicklookResult<Self> {
        let root = root.as_ref().to_path_buf();
        let config = PathsConfig::load(root.join(CONFIG_FILE))?;
        let manifest = Manifest::load(anchor(&root, &config.manifest))?;
        Ok(Self::new(root, config, manifest))
    }

    /// Load from `$QUICKLOOK_ROOT`, or the current directory.
    pub fn discover() -> QuicklookResult<Self> {
        let root = match std::env::var_os(ROOT_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir()?,
        };
        Self::load(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PathsConfig {
        &self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The declared dataset, or `ConfigError`.
    pub fn dataset(&self, dataset_type: &str) -> QuicklookResult<&DatasetSpec> {
        self.config.dataset(dataset_type).ok_or_else(|| {
            QuicklookError::config(format!(
                "Dataset type '{}' is not declared in {}",
                dataset_type, CONFIG_FILE
            ))
        })
    }

    /// Dataset root, anchored at the repository root when relative.
    pub fn dataset_root(&self, dataset_type: &str) -> QuicklookResult<PathBuf> {
        Ok(anchor(&self.root, &self.dataset(dataset_type)?.root))
    }

    /// Resolve a manifest entry to an existing absolute path.
    ///
    /// Only the manifest (already in memory) is consulted before the final
    /// existence check, so a missing row fails without touching the dataset.
    pub fn resolve(&self, dataset_type: &str, role: &str) -> QuicklookResult<ResolvedPath> {
        let dataset_root = self.dataset_root(dataset_type)?;
        let entry = self.manifest.get(dataset_type, role).ok_or_else(|| {
            QuicklookError::ManifestLookup {
                dataset_type: dataset_type.to_string(),
                role: role.to_string(),
            }
        })?;

        let candidate = anchor(&dataset_root, &entry.path);
        let missing = || QuicklookError::MissingFile {
            dataset_type: dataset_type.to_string(),
            role: role.to_string(),
            path: candidate.clone(),
        };
        if !candidate.exists() {
            return Err(missing());
        }
        let path = candidate.canonicalize().map_err(|_| missing())?;

        debug!(dataset_type, role, path = %path.display(), "Resolved");
        Ok(ResolvedPath {
            dataset_type: dataset_type.to_string(),
            role: role.to_string(),
            path,
        })
    }

    /// Resolve the dataset's canonical sample.
    pub fn resolve_sample(&self, dataset_type: &str) -> QuicklookResult<ResolvedPath> {
        let role = self.dataset(dataset_type)?.sample_role.clone();
        self.resolve(dataset_type, &role)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        anchor(&self.root, &self.config.outputs_dir)
    }

    /// `<outputs_dir>/<stem>_h<HH>.png`
    pub fn output_path(&self, stem: &str, hour: usize) -> PathBuf {
        self.outputs_dir().join(format!("{}_h{:02}.png", stem, hour))
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
