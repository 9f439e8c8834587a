//! Human-readable overview of the configured datasets.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use grid_processor::read_boundary_dir;
use netcdf_parser::{open_dataset, ArrayHandle};
use path_registry::Resolver;
use tracing::warn;
use walkdir::WalkDir;

const MAX_VARIABLES: usize = 10;
const BOUNDARY_FILES: usize = 3;
const BOUNDARY_HEAD: usize = 4;
const FLEXPART_OUTPUTS: usize = 5;
const FLEXPART_DEPTH: usize = 3;

/// IOAPI global attributes worth printing.
const IOAPI_ATTRS: [&str; 12] = [
    "NCOLS", "NROWS", "NLAYS", "GDTYP", "P_ALP", "P_BET", "P_GAM", "XCELL", "YCELL", "XORIG",
    "YORIG", "GDNAM",
];

pub fn write_summary<W: Write>(out: &mut W, resolver: &Resolver) -> io::Result<()> {
    writeln!(out, "[Paths]")?;
    writeln!(out, "root: {}", resolver.root().display())?;
    writeln!(out, "outputs: {}", resolver.outputs_dir().display())?;
    for name in resolver.config().dataset_names() {
        if let Ok(root) = resolver.dataset_root(name) {
            writeln!(out, "{}: {}", name, root.display())?;
        }
    }

    netcdf_section(out, resolver, "WRF", "wrf", |_, _| Ok(()))?;
    netcdf_section(out, resolver, "Emissions", "emiss", ioapi_attributes::<W>)?;
    boundary_section(out, resolver)?;
    flexpart_section(out, resolver)?;

    writeln!(out, "\nDone.")
}

fn netcdf_section<W, F>(
    out: &mut W,
    resolver: &Resolver,
    title: &str,
    dataset: &str,
    extra: F,
) -> io::Result<()>
where
    W: Write,
    F: Fn(&mut W, &ArrayHandle) -> io::Result<()>,
{
    writeln!(out, "\n[{}]", title)?;
    let resolved = match resolver.resolve_sample(dataset) {
        Ok(r) => r,
        Err(e) => {
            writeln!(out, "  ({})", e)?;
            return Ok(());
        }
    };
    writeln!(out, "file: {}", resolved.path().display())?;

    let handle = match open_dataset(resolved.path()) {
        Ok(h) => h,
        Err(e) => {
            warn!(dataset, error = %e, "Could not open sample");
            writeln!(out, "  ERROR opening: {}", e)?;
            return Ok(());
        }
    };

    let dims: Vec<String> = handle
        .dimensions()
        .iter()
        .map(|d| format!("{}={}", d.name, d.len))
        .collect();
    writeln!(out, "dims: {}", dims.join(", "))?;

    let vars: Vec<String> = handle.variable_names().into_iter().take(MAX_VARIABLES).collect();
    writeln!(out, "vars (first {}): {}", MAX_VARIABLES, vars.join(", "))?;

    extra(out, &handle)
}

fn ioapi_attributes<W: Write>(out: &mut W, handle: &ArrayHandle) -> io::Result<()> {
    for key in IOAPI_ATTRS {
        if let Some(value) = handle.global_attribute(key) {
            writeln!(out, "attr {}: {}", key, value)?;
        }
    }
    Ok(())
}

fn boundary_section<W: Write>(out: &mut W, resolver: &Resolver) -> io::Result<()> {
    writeln!(out, "\n[Boundaries]")?;
    let Some(dir) = existing_root(out, resolver, "boundary")? else {
        return Ok(());
    };

    let outlines = match read_boundary_dir(&dir) {
        Ok(outlines) => outlines,
        Err(e) => {
            warn!(error = %e, "Could not read boundaries");
            writeln!(out, "  ERROR reading: {}", e)?;
            return Ok(());
        }
    };
    if outlines.is_empty() {
        writeln!(out, "  (no .txt polygons)")?;
    }
    writeln!(out, "boundaries: {}", outlines.len())?;

    for outline in outlines.iter().take(BOUNDARY_FILES) {
        let path = dir.join(format!("{}.txt", outline.name));
        writeln!(out, "file: {}.txt", outline.name)?;
        writeln!(out, "  points: {}", outline.points.len())?;
        match head(&path, BOUNDARY_HEAD) {
            Ok(lines) => writeln!(out, "  head: {:?} ...", lines)?,
            Err(e) => writeln!(out, "  ERROR reading: {}", e)?,
        }
    }
    Ok(())
}

fn flexpart_section<W: Write>(out: &mut W, resolver: &Resolver) -> io::Result<()> {
    writeln!(out, "\n[FLEXPART runs]")?;
    let Some(dir) = existing_root(out, resolver, "flexpart")? else {
        return Ok(());
    };

    let mut runs: Vec<String> = fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    runs.sort();
    writeln!(out, "subdirs: {}", runs.join(", "))?;

    let outputs: Vec<String> = WalkDir::new(&dir)
        .max_depth(FLEXPART_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_flexpart_output(e.path()))
        .take(FLEXPART_OUTPUTS)
        .map(|e| {
            e.path()
                .strip_prefix(&dir)
                .unwrap_or(e.path())
                .display()
                .to_string()
        })
        .collect();
    writeln!(out, "example outputs: {}", outputs.join(", "))?;
    Ok(())
}

/// `flxout_*.nc`, `partposit_*`, `header*` or any `*.txt`.
fn is_flexpart_output(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    (name.starts_with("flxout_") && name.ends_with(".nc"))
        || name.starts_with("partposit_")
        || name.starts_with("header")
        || name.ends_with(".txt")
}

fn existing_root<W: Write>(
    out: &mut W,
    resolver: &Resolver,
    dataset: &str,
) -> io::Result<Option<std::path::PathBuf>> {
    match resolver.dataset_root(dataset) {
        Ok(dir) if dir.is_dir() => {
            writeln!(out, "dir: {}", dir.display())?;
            Ok(Some(dir))
        }
        Ok(dir) => {
            writeln!(out, "dir: {}\n  (dir missing)", dir.display())?;
            Ok(None)
        }
        Err(e) => {
            writeln!(out, "  ({})", e)?;
            Ok(None)
        }
    }
}

fn head(path: &Path, n: usize) -> io::Result<Vec<String>> {
    BufReader::new(fs::File::open(path)?)
        .lines()
        .take(n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flexpart_output_names() {
        assert!(is_flexpart_output(Path::new("run/flxout_20190101.nc")));
        assert!(is_flexpart_output(Path::new("partposit_end")));
        assert!(is_flexpart_output(Path::new("header_txt")));
        assert!(!is_flexpart_output(Path::new("flxout_20190101.grb")));
    }

    #[test]
    fn test_head_reads_first_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.txt");
        fs::write(&path, "a\nb\nc\n").unwrap();
        assert_eq!(head(&path, 2).unwrap(), vec!["a", "b"]);
    }
}
