//! Boundary outline text files.
//!
//! Each file has two header lines followed by `lon,lat,z` rows. The `z`
//! column is ignored.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use quicklook_common::{Outline, QuicklookError, QuicklookResult};
use tracing::{debug, warn};

const HEADER_LINES: usize = 2;

/// Read one boundary file. The outline is named after the file stem.
pub fn read_boundary(path: &Path) -> QuicklookResult<Outline> {
    let corrupt = |message: String| QuicklookError::DatasetOpen {
        path: path.to_path_buf(),
        message,
    };

    // Header lines are free text: possibly blank, quoted or not UTF-8.
    let mut reader = BufReader::new(File::open(path).map_err(|e| corrupt(e.to_string()))?);
    let mut header = Vec::new();
    for _ in 0..HEADER_LINES {
        header.clear();
        reader
            .read_until(b'\n', &mut header)
            .map_err(|e| corrupt(e.to_string()))?;
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| corrupt(e.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line() as usize + HEADER_LINES)
            .unwrap_or_default();
        let coord = |col: usize| -> QuicklookResult<f64> {
            record
                .get(col)
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| corrupt(format!("line {}: expected lon,lat,z", line)))
        };
        points.push((coord(0)?, coord(1)?));
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(boundary = %name, points = points.len(), "Read boundary");
    Ok(Outline::new(name, points))
}

/// Read every `*.txt` boundary in `dir`, sorted by name.
pub fn read_boundary_dir(dir: &Path) -> QuicklookResult<Vec<Outline>> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| QuicklookError::DatasetOpen {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    paths.sort();

    let mut outlines = Vec::with_capacity(paths.len());
    for path in paths {
        let outline = read_boundary(&path)?;
        if !outline.is_drawable() {
            warn!(boundary = %outline.name, "Boundary has fewer than two points");
        }
        outlines.push(outline);
    }
    Ok(outlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Denali.txt");
        fs::write(&path, "Denali Borough\nlon,lat,z\n-150.0,63.0,0\n-149.0,63.5,0\n\n").unwrap();

        let outline = read_boundary(&path).unwrap();
        assert_eq!(outline.name, "Denali");
        assert_eq!(outline.points, vec![(-150.0, 63.0), (-149.0, 63.5)]);
    }

    #[test]
    fn test_header_lines_are_physical_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Fairbanks.txt");
        fs::write(
            &path,
            "\"Fairbanks, North Star\n\n-148.2,64.2,0\n\n-146.9,64.2,0\nbad\"row,1,0\n",
        )
        .unwrap();

        let err = read_boundary(&path).unwrap_err();
        assert!(err.to_string().contains("line 6"), "{}", err);

        fs::write(&path, "\"Fairbanks, North Star\n\n-148.2,64.2,0\n-146.9,64.2,0\n").unwrap();
        let outline = read_boundary(&path).unwrap();
        assert_eq!(outline.points, vec![(-148.2, 64.2), (-146.9, 64.2)]);
    }

    #[test]
    fn test_bad_row_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bad.txt");
        fs::write(&path, "h1\nh2\n-150.0,north,0\n").unwrap();

        let err = read_boundary(&path).unwrap_err();
        assert_eq!(err.kind(), "DatasetOpenError");
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_directory_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt"] {
            fs::write(dir.path().join(name), "h\nh\n0,0,0\n1,1,0\n").unwrap();
        }
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let outlines = read_boundary_dir(dir.path()).unwrap();
        let names: Vec<_> = outlines.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
