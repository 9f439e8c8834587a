//! The sample manifest (`samples/manifest.tsv`).
//!
//! Tab-separated `dataset_type  role  path [note]`. Lines starting with `#`
//! and blank lines are ignored, as is a leading header row.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use quicklook_common::{QuicklookError, QuicklookResult};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub dataset_type: String,
    pub role: String,
    /// Relative paths are taken relative to the dataset root.
    pub path: PathBuf,
    pub note: Option<String>,
}

/// Manifest rows with `(dataset_type, role)` unique.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn load<P: AsRef<Path>>(path: P) -> QuicklookResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            QuicklookError::config(format!("Failed to open manifest {}: {}", path.display(), e))
        })?;
        let manifest = Self::from_reader(file)?;
        debug!(path = %path.display(), rows = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    pub fn from_reader<R: Read>(reader: R) -> QuicklookResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut manifest = Manifest::default();
        let mut first = true;

        for record in rdr.records() {
            let record =
                record.map_err(|e| QuicklookError::config(format!("Malformed manifest: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.iter().all(str::is_empty) {
                continue;
            }
            if first {
                first = false;
                if record.get(0) == Some("dataset_type") && record.get(1) == Some("role") {
                    continue;
                }
            }

            let field = |i: usize| record.get(i).filter(|s| !s.is_empty());
            let (Some(dataset_type), Some(role), Some(path)) = (field(0), field(1), field(2))
            else {
                return Err(QuicklookError::config(format!(
                    "Manifest line {}: expected dataset_type, role and path, got {} column(s)",
                    line,
                    record.len()
                )));
            };

            manifest.insert(ManifestEntry {
                dataset_type: dataset_type.to_string(),
                role: role.to_string(),
                path: PathBuf::from(path),
                note: field(3).map(str::to_string),
            })?;
        }

        Ok(manifest)
    }

    /// Add an entry, rejecting a second row for the same pair.
    pub fn insert(&mut self, entry: ManifestEntry) -> QuicklookResult<()> {
        if self.get(&entry.dataset_type, &entry.role).is_some() {
            return Err(QuicklookError::config(format!(
                "Duplicate manifest entry for {}/{}",
                entry.dataset_type, entry.role
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, dataset_type: &str, role: &str) -> Option<&ManifestEntry> {
        self.entries
            .iter()
            .find(|e| e.dataset_type == dataset_type && e.role == role)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> QuicklookResult<Manifest> {
        Manifest::from_reader(text.as_bytes())
    }

    #[test]
    fn test_header_comments_and_notes() {
        let m = parse(
            "# samples\n\
             dataset_type\trole\tpath\tnote\n\
             \n\
             wrf\tsample\twrfout_d01_2019-06-01.nc\tfirst day\n\
             emiss\tsample\t/abs/emiss.nc\n",
        )
        .unwrap();

        assert_eq!(m.len(), 2);
        let wrf = m.get("wrf", "sample").unwrap();
        assert_eq!(wrf.path, PathBuf::from("wrfout_d01_2019-06-01.nc"));
        assert_eq!(wrf.note.as_deref(), Some("first day"));
        assert_eq!(m.get("emiss", "sample").unwrap().note, None);
        assert!(m.get("emiss", "overlay").is_none());
    }

    #[test]
    fn test_header_is_optional() {
        let m = parse("wrf\tsample\ta.nc\n").unwrap();
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_duplicate_pair_is_rejected() {
        let err = parse("wrf\tsample\ta.nc\nwrf\tsample\tb.nc\n").unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
        assert!(err.to_string().contains("wrf/sample"));
    }

    #[test]
    fn test_same_type_different_roles() {
        let m = parse("boundary\tsample\tA.txt\nboundary\toverlay\tA.txt\n").unwrap();
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let err = parse("wrf\tsample\n").unwrap_err();
        assert!(err.to_string().contains("got 2 column(s)"));
    }
}
