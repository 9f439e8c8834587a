//! Coarse alignment check between a WRF grid and an IOAPI emissions grid.
//!
//! Both describe a Lambert conformal grid, under different attribute names:
//!
//! | WRF           | IOAPI   | tolerance |
//! |---------------|---------|-----------|
//! | `TRUELAT1`    | `P_ALP` | angle     |
//! | `TRUELAT2`    | `P_BET` | angle     |
//! | `STAND_LON`   | `P_GAM` | angle     |
//! | `DX`          | `XCELL` | cell      |
//! | `DY`          | `YCELL` | cell      |
//! | `west_east`   | `NCOLS` | count     |
//! | `south_north` | `NROWS` | count     |

use netcdf_parser::ArrayHandle;
use tracing::info;

use crate::report::ValidationReport;
use crate::schema::Validator;

/// Dataset name used for the compatibility report.
pub const GRID_COMPAT_REPORT: &str = "grid_compatibility";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTolerances {
    /// Degrees.
    pub angle: f64,
    /// Meters.
    pub cell: f64,
    /// Grid cells.
    pub count: f64,
}

impl Default for GridTolerances {
    fn default() -> Self {
        Self {
            angle: 0.25,
            cell: 100.0,
            count: 5.0,
        }
    }
}

#[derive(Clone, Copy)]
enum Tol {
    Angle,
    Cell,
    Count,
}

const PAIRS: [(&str, &str, Tol); 7] = [
    ("TRUELAT1", "P_ALP", Tol::Angle),
    ("TRUELAT2", "P_BET", Tol::Angle),
    ("STAND_LON", "P_GAM", Tol::Angle),
    ("DX", "XCELL", Tol::Cell),
    ("DY", "YCELL", Tol::Cell),
    ("west_east", "NCOLS", Tol::Count),
    ("south_north", "NROWS", Tol::Count),
];

/// Compare projection parameters of an open WRF file and an open
/// emissions file. A parameter missing on either side fails its check.
pub fn grid_compatibility(
    wrf: &ArrayHandle,
    emiss: &ArrayHandle,
    tol: GridTolerances,
) -> ValidationReport {
    let mut report = ValidationReport::new(GRID_COMPAT_REPORT);

    for (wrf_key, ioapi_key, kind) in PAIRS {
        let check = format!("{}~{}", wrf_key, ioapi_key);
        let limit = match kind {
            Tol::Angle => tol.angle,
            Tol::Cell => tol.cell,
            Tol::Count => tol.count,
        };

        match (wrf_param(wrf, wrf_key), ioapi_param(emiss, ioapi_key)) {
            (Some(a), Some(b)) => {
                let diff = (a - b).abs();
                let detail = format!("{} vs {} (|diff| {:.3}, limit {})", a, b, diff, limit);
                report.record(check, diff <= limit, detail);
            }
            (a, b) => {
                let missing: Vec<&str> = [(a.is_none(), wrf_key), (b.is_none(), ioapi_key)]
                    .into_iter()
                    .filter_map(|(gone, key)| gone.then_some(key))
                    .collect();
                report.fail(check, format!("missing {}", missing.join(", ")));
            }
        }
    }

    info!(passed = report.passed(), "Grid compatibility checked");
    report
}

/// WRF parameters are global attributes, except grid sizes which are
/// dimensions.
fn wrf_param(handle: &ArrayHandle, key: &str) -> Option<f64> {
    handle
        .global_attribute(key)
        .and_then(|v| v.as_f64())
        .or_else(|| handle.dimension_len(key).map(|n| n as f64))
}

fn ioapi_param(handle: &ArrayHandle, key: &str) -> Option<f64> {
    handle.global_attribute(key).and_then(|v| v.as_f64())
}

impl Validator<'_> {
    /// Resolve and open the `wrf` and `emiss` samples and compare grids.
    pub fn grid_compatibility(&self, tol: GridTolerances) -> ValidationReport {
        let open = |dataset: &str| -> Result<ArrayHandle, String> {
            let resolved = self
                .resolver()
                .resolve_sample(dataset)
                .map_err(|e| format!("{}: {}", e.kind(), e))?;
            netcdf_parser::open_dataset(resolved.path()).map_err(|e| e.to_string())
        };

        match (open("wrf"), open("emiss")) {
            (Ok(wrf), Ok(emiss)) => grid_compatibility(&wrf, &emiss, tol),
            (wrf, emiss) => {
                let mut report = ValidationReport::new(GRID_COMPAT_REPORT);
                for (name, result) in [("wrf", wrf), ("emiss", emiss)] {
                    match result {
                        Ok(_) => report.pass(format!("open:{}", name), "opened read-only"),
                        Err(e) => report.fail(format!("open:{}", name), e),
                    }
                }
                report.skip_all(PAIRS.iter().map(|(a, b, _)| format!("{}~{}", a, b)));
                report
            }
        }
    }
}
