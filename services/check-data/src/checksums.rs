//! SHA-256 of every manifest sample.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use path_registry::Resolver;
use quicklook_common::{QuicklookError, QuicklookResult};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

pub const CHECKSUM_FILE: &str = "sample_checksums.tsv";
pub const MISSING: &str = "MISSING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRow {
    pub dataset_type: String,
    pub role: String,
    /// As written in the manifest.
    pub path: PathBuf,
    pub note: String,
    /// Hex digest, or [`MISSING`].
    pub sha256: String,
}

/// Stream a file through SHA-256.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// One row per manifest entry, in manifest order. Entries that do not
/// resolve to a readable file are marked [`MISSING`].
pub fn checksum_rows(resolver: &Resolver) -> Vec<ChecksumRow> {
    resolver
        .manifest()
        .entries()
        .iter()
        .map(|entry| {
            let digest = resolver
                .resolve(&entry.dataset_type, &entry.role)
                .and_then(|resolved| sha256_file(resolved.path()).map_err(QuicklookError::from));
            let sha256 = match digest {
                Ok(hex) => hex,
                Err(e) => {
                    warn!(dataset = %entry.dataset_type, role = %entry.role, error = %e, "Sample unavailable");
                    MISSING.to_string()
                }
            };
            debug!(dataset = %entry.dataset_type, role = %entry.role, %sha256, "Hashed sample");
            ChecksumRow {
                dataset_type: entry.dataset_type.clone(),
                role: entry.role.clone(),
                path: entry.path.clone(),
                note: entry.note.clone().unwrap_or_default(),
                sha256,
            }
        })
        .collect()
}

/// Write `<outputs_dir>/sample_checksums.tsv` and return its path.
pub fn write_checksums(resolver: &Resolver, rows: &[ChecksumRow]) -> QuicklookResult<PathBuf> {
    let dir = resolver.outputs_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join(CHECKSUM_FILE);

    let csv_err = |e: csv::Error| QuicklookError::Io(io::Error::new(io::ErrorKind::Other, e));
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .map_err(csv_err)?;
    wtr.write_record(["dataset", "role", "filepath", "note", "sha256"])
        .map_err(csv_err)?;
    for row in rows {
        let file = row.path.display().to_string();
        wtr.write_record([
            row.dataset_type.as_str(),
            row.role.as_str(),
            file.as_str(),
            row.note.as_str(),
            row.sha256.as_str(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(path)
}
