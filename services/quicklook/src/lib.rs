//! Quicklook pipelines: resolve samples, derive a field, render a PNG.
//!
//! ```text
//! Resolver ──▶ ArrayHandle ──▶ NetCdfSource ──▶ Field2D ──▶ renderer::render
//!                   │                                 ▲
//!                   └── XLAT/XLONG ──▶ LatLonGrid ─────┘ (extent)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use grid_processor::{
    read_boundary, slice_hour, wind_speed_10m, LatLonGrid, LevelReduction, NetCdfSource,
};
use netcdf_parser::{open_dataset, ArrayHandle};
use path_registry::Resolver;
use quicklook_common::{BoundingBox, Field2D, Outline, QuicklookError, QuicklookResult};
use tracing::{info, instrument, warn};

pub const WRF: &str = "wrf";
pub const EMISS: &str = "emiss";
pub const BOUNDARY: &str = "boundary";
/// Manifest role of the boundary drawn over quicklooks.
pub const OVERLAY_ROLE: &str = "overlay";

const U_WIND: &str = "U10";
const V_WIND: &str = "V10";
const LAT: &str = "XLAT";
const LON: &str = "XLONG";
const EMISS_VAR: &str = "emiss";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    /// 10 m wind speed from WRF `U10`/`V10`
    Wind,
    /// Gridded emissions summed over layers
    Emiss,
}

impl Kind {
    /// File name stem of the PNG.
    pub fn stem(self) -> &'static str {
        match self {
            Kind::Wind => "wind",
            Kind::Emiss => "co_emiss",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Wind => write!(f, "wind"),
            Kind::Emiss => write!(f, "emiss"),
        }
    }
}

/// Build the field for `kind` at `hour` and render it. Returns the PNG path.
#[instrument(skip(resolver))]
pub fn run(resolver: &Resolver, kind: Kind, hour: usize) -> QuicklookResult<PathBuf> {
    let field = match kind {
        Kind::Wind => wind_field(resolver, hour)?,
        Kind::Emiss => emiss_field(resolver, hour)?,
    };
    let outlines = overlay_outlines(resolver)?;

    let path = resolver.output_path(kind.stem(), hour);
    let rendered = renderer::render(&field, &path, outlines.as_deref())?;
    info!(
        path = %rendered.path.display(),
        min = rendered.range.0,
        max = rendered.range.1,
        outline_segments = rendered.outline_segments,
        "Quicklook complete"
    );
    Ok(rendered.path)
}

/// 10 m wind speed at `hour`, placed on the WRF lon/lat extent when the
/// sample carries `XLAT`/`XLONG`.
pub fn wind_field(resolver: &Resolver, hour: usize) -> QuicklookResult<Field2D> {
    let wrf = resolver.resolve_sample(WRF)?;
    let handle = open_dataset(wrf.path())?;

    let u = NetCdfSource::new(&handle, U_WIND)?;
    let v = NetCdfSource::new(&handle, V_WIND)?;
    let field = wind_speed_10m(&u, &v, hour)?;

    match coordinates(&handle, hour)? {
        Some(grid) => Ok(field.with_extent(coordinate_extent(&grid))),
        None => Ok(field),
    }
}

/// Emissions at `hour`, summed over `LAY`, on the centered window of the
/// WRF coordinates at time 0.
pub fn emiss_field(resolver: &Resolver, hour: usize) -> QuicklookResult<Field2D> {
    let emiss = resolver.resolve_sample(EMISS)?;
    let wrf = resolver.resolve_sample(WRF)?;

    let field = layer_total(emiss.path(), hour)?;

    let handle = open_dataset(wrf.path())?;
    match coordinates(&handle, 0)? {
        Some(grid) => {
            let window = grid.crop_center(field.width, field.height)?;
            Ok(field.with_extent(coordinate_extent(&window)))
        }
        None => Ok(field),
    }
}

/// Column total of `emiss` at `hour`. The file is closed on return.
fn layer_total(path: &Path, hour: usize) -> QuicklookResult<Field2D> {
    let handle = open_dataset(path)?;
    let source = NetCdfSource::new(&handle, EMISS_VAR)?.with_reduction(LevelReduction::Sum);
    slice_hour(&source, hour)
}

/// `XLAT`/`XLONG` at `time_index`, or `None` when the file has neither.
fn coordinates(handle: &ArrayHandle, time_index: usize) -> QuicklookResult<Option<LatLonGrid>> {
    if !(handle.has_variable(LAT) && handle.has_variable(LON)) {
        warn!(path = %handle.path().display(), "No XLAT/XLONG, using grid indices");
        return Ok(None);
    }
    LatLonGrid::from_handle(handle, LAT, LON, time_index).map(Some)
}

/// Lon/lat box of `grid`. Coordinates with no finite point give a NaN box,
/// which the renderer rejects as degenerate.
fn coordinate_extent(grid: &LatLonGrid) -> BoundingBox {
    grid.extent().unwrap_or_else(|| {
        warn!("XLAT/XLONG hold no finite values");
        BoundingBox::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    })
}

/// The `(boundary, overlay)` outline, or `None` when the manifest has no
/// such row.
pub fn overlay_outlines(resolver: &Resolver) -> QuicklookResult<Option<Vec<Outline>>> {
    match resolver.resolve(BOUNDARY, OVERLAY_ROLE) {
        Ok(resolved) => {
            let outline = read_boundary(resolved.path())?;
            if !outline.is_drawable() {
                warn!(boundary = %outline.name, "Boundary has fewer than two points");
            }
            Ok(Some(vec![outline]))
        }
        Err(QuicklookError::ManifestLookup { .. }) => {
            info!("No boundary overlay in manifest, drawing without outline");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stems() {
        assert_eq!(Kind::Wind.stem(), "wind");
        assert_eq!(Kind::Emiss.stem(), "co_emiss");
    }

    #[test]
    fn test_missing_coordinates_give_degenerate_extent() {
        let lat = vec![f32::NAN; 6];
        let lon = vec![f32::NAN; 6];
        let grid = LatLonGrid::new(lat, lon, 3, 2).unwrap();
        assert!(coordinate_extent(&grid).is_degenerate());
    }
}
