//! On-disk fixtures shaped like the real sample datasets.
//!
//! The NetCDF writers produce small files with the same variable names,
//! dimension names and global attributes as WRF `wrfout` files and IOAPI
//! emissions files. [`TestRepo`] lays out a complete repository
//! (configuration, manifest, data) in a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::generators::{
    create_emission_cube, create_latlon_planes, create_u_wind_cube, create_v_wind_cube,
};

/// Shape of a WRF fixture.
#[derive(Debug, Clone, Copy)]
pub struct WrfFixture {
    pub times: usize,
    pub south_north: usize,
    pub west_east: usize,
    /// Whether to write `XLAT`/`XLONG`.
    pub with_coords: bool,
    /// Lat/lon spacing of the coordinate planes. Zero gives constant
    /// coordinates.
    pub coord_step: f32,
}

impl Default for WrfFixture {
    fn default() -> Self {
        Self {
            times: 3,
            south_north: 6,
            west_east: 8,
            with_coords: true,
            coord_step: WRF_STEP,
        }
    }
}

/// Southwest corner and spacing of the fixture lat/lon grid.
pub const WRF_LAT0: f32 = 64.0;
pub const WRF_LON0: f32 = -148.5;
pub const WRF_STEP: f32 = 0.25;

/// Write a WRF-like file: `U10`, `V10`, `XLAT`, `XLONG` over
/// `(Time, south_north, west_east)` plus Lambert projection attributes.
pub fn write_wrf_fixture(path: &Path, spec: WrfFixture) -> netcdf::Result<()> {
    let WrfFixture {
        times,
        south_north: ny,
        west_east: nx,
        with_coords,
        coord_step,
    } = spec;
    let dims = ["Time", "south_north", "west_east"];

    let mut file = netcdf::create(path)?;
    file.add_attribute("TITLE", " OUTPUT FROM WRF V4.2 MODEL")?;
    file.add_attribute("MAP_PROJ", 1i32)?;
    file.add_attribute("DX", 1333.3334f32)?;
    file.add_attribute("DY", 1333.3334f32)?;
    file.add_attribute("TRUELAT1", 64.0f32)?;
    file.add_attribute("TRUELAT2", 66.0f32)?;
    file.add_attribute("STAND_LON", -147.7f32)?;
    file.add_attribute("WEST-EAST_GRID_DIMENSION", (nx + 1) as i32)?;
    file.add_attribute("SOUTH-NORTH_GRID_DIMENSION", (ny + 1) as i32)?;

    file.add_unlimited_dimension("Time")?;
    file.add_dimension("south_north", ny)?;
    file.add_dimension("west_east", nx)?;

    {
        let mut u = file.add_variable::<f32>("U10", &dims)?;
        u.put_attribute("units", "m s-1")?;
        u.put_attribute("description", "U at 10 M")?;
        u.put_values(&create_u_wind_cube(nx, ny, times), (0..times, .., ..))?;
    }
    {
        let mut v = file.add_variable::<f32>("V10", &dims)?;
        v.put_attribute("units", "m s-1")?;
        v.put_attribute("description", "V at 10 M")?;
        v.put_values(&create_v_wind_cube(nx, ny, times), (0..times, .., ..))?;
    }

    if with_coords {
        let (lat, lon) = create_latlon_planes(nx, ny, WRF_LAT0, WRF_LON0, coord_step);
        let lat_cube: Vec<f32> = lat.iter().copied().cycle().take(lat.len() * times).collect();
        let lon_cube: Vec<f32> = lon.iter().copied().cycle().take(lon.len() * times).collect();

        let mut xlat = file.add_variable::<f32>("XLAT", &dims)?;
        xlat.put_attribute("units", "degree_north")?;
        xlat.put_values(&lat_cube, (0..times, .., ..))?;

        let mut xlong = file.add_variable::<f32>("XLONG", &dims)?;
        xlong.put_attribute("units", "degree_east")?;
        xlong.put_values(&lon_cube, (0..times, .., ..))?;
    }

    Ok(())
}

/// Shape of an IOAPI emissions fixture.
#[derive(Debug, Clone, Copy)]
pub struct EmissFixture {
    pub tsteps: usize,
    pub layers: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Default for EmissFixture {
    /// Two cells smaller than the default WRF fixture in each direction.
    fn default() -> Self {
        Self {
            tsteps: 3,
            layers: 2,
            rows: 4,
            cols: 6,
        }
    }
}

/// Seed used for the emission values written by [`write_emiss_fixture`].
pub const EMISS_SEED: u32 = 17;

/// Write an IOAPI-like emissions file: `emiss(TSTEP, LAY, ROW, COL)` plus
/// grid description attributes.
pub fn write_emiss_fixture(path: &Path, spec: EmissFixture) -> netcdf::Result<()> {
    let EmissFixture {
        tsteps,
        layers,
        rows,
        cols,
    } = spec;

    let mut file = netcdf::create(path)?;
    file.add_attribute("GDTYP", 2i32)?;
    file.add_attribute("P_ALP", 64.0f64)?;
    file.add_attribute("P_BET", 66.0f64)?;
    file.add_attribute("P_GAM", -147.7f64)?;
    file.add_attribute("XCELL", 1333.3334f64)?;
    file.add_attribute("YCELL", 1333.3334f64)?;
    file.add_attribute("XORIG", -5333.3336f64)?;
    file.add_attribute("YORIG", -4000.0f64)?;
    file.add_attribute("NCOLS", cols as i32)?;
    file.add_attribute("NROWS", rows as i32)?;
    file.add_attribute("NLAYS", layers as i32)?;
    file.add_attribute("VAR-LIST", "emiss           ")?;

    file.add_unlimited_dimension("TSTEP")?;
    file.add_dimension("LAY", layers)?;
    file.add_dimension("ROW", rows)?;
    file.add_dimension("COL", cols)?;

    let mut var = file.add_variable::<f32>("emiss", &["TSTEP", "LAY", "ROW", "COL"])?;
    var.put_attribute("units", "moles/s         ")?;
    var.put_attribute("long_name", "CO")?;
    var.put_values(
        &create_emission_cube(cols, rows, layers, tsteps, EMISS_SEED),
        (0..tsteps, .., .., ..),
    )?;

    Ok(())
}

/// A small boundary polygon around the fixture grid, in the text layout of
/// the shipped boundary files: two header lines, then `lon,lat,z` rows.
pub const BOUNDARY_TEXT: &str = "\
Fairbanks North Star Borough
lon,lat,z
-148.2,64.2,0
-146.9,64.2,0
-146.9,65.1,0
-148.2,65.1,0
-148.2,64.2,0
";

pub fn write_boundary_fixture(path: &Path) -> std::io::Result<()> {
    fs::write(path, BOUNDARY_TEXT)
}

/// Manifest rows written by [`TestRepo::new`].
pub const DEFAULT_MANIFEST_ROWS: &[(&str, &str, &str)] = &[
    ("wrf", "sample", "wrfout_d01_sample.nc"),
    ("emiss", "sample", "emiss_d01_sample.nc"),
    ("boundary", "sample", "Fairbanks.txt"),
    ("boundary", "overlay", "Fairbanks.txt"),
    ("flexpart", "sample", "run_001/header_txt"),
];

/// Configuration written by [`TestRepo::new`]. Dimension lengths match the
/// default fixtures.
pub const DEFAULT_CONFIG: &str = r#"# Dataset roots and schema expectations
manifest: samples/manifest.tsv
outputs_dir: outputs
datasets:
  wrf:
    root: ${QUICKLOOK_TEST_DATA:-data}/wrf
    description: WRF meteorology
    schema:
      dims:
        Time: nonzero
        south_north: 6
        west_east: 8
      variables: [U10, V10, XLAT, XLONG]
      attributes:
        MAP_PROJ: { exact: 1 }
        DX: { type: float }
        TRUELAT1: { exact: 64.0 }
        TITLE: present
  emiss:
    root: data/emiss
    description: Gridded CO emissions (IOAPI)
    schema:
      dims:
        TSTEP: nonzero
        LAY: nonzero
        ROW: 4
        COL: 6
      variables: [emiss]
      attributes:
        GDTYP: { exact: 2 }
        XCELL: { type: number }
  flexpart:
    root: data/flexpart
    format: text
    description: FLEXPART runs (listed only)
    files: [run_001/header_txt]
  boundary:
    root: data/boundaries
    format: text
    files: [Fairbanks.txt]
"#;

/// A complete repository in a temporary directory.
///
/// Layout:
///
/// ```text
/// important_paths.yaml
/// samples/manifest.tsv
/// data/wrf/wrfout_d01_sample.nc
/// data/emiss/emiss_d01_sample.nc
/// data/boundaries/Fairbanks.txt
/// data/flexpart/run_001/header_txt
/// ```
pub struct TestRepo {
    dir: tempfile::TempDir,
}

impl TestRepo {
    /// Build the repository with default fixtures.
    pub fn new() -> Self {
        Self::with_fixtures(WrfFixture::default(), EmissFixture::default())
    }

    pub fn with_fixtures(wrf: WrfFixture, emiss: EmissFixture) -> Self {
        let dir = crate::temp_test_dir_with_prefix("quicklook_repo_");
        let repo = Self { dir };

        for sub in ["samples", "data/wrf", "data/emiss", "data/boundaries", "data/flexpart/run_001"] {
            fs::create_dir_all(repo.root().join(sub)).expect("Failed to create fixture dir");
        }

        fs::write(repo.config_path(), DEFAULT_CONFIG).expect("Failed to write config");
        repo.write_manifest(DEFAULT_MANIFEST_ROWS);

        write_wrf_fixture(&repo.wrf_path(), wrf).expect("Failed to write WRF fixture");
        write_emiss_fixture(&repo.emiss_path(), emiss).expect("Failed to write emissions fixture");
        write_boundary_fixture(&repo.root().join("data/boundaries/Fairbanks.txt"))
            .expect("Failed to write boundary fixture");
        fs::write(
            repo.root().join("data/flexpart/run_001/header_txt"),
            "FLEXPART header\n",
        )
        .expect("Failed to write FLEXPART fixture");

        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("important_paths.yaml")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("samples/manifest.tsv")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root().join("outputs")
    }

    pub fn wrf_path(&self) -> PathBuf {
        self.root().join("data/wrf/wrfout_d01_sample.nc")
    }

    pub fn emiss_path(&self) -> PathBuf {
        self.root().join("data/emiss/emiss_d01_sample.nc")
    }

    /// Replace the manifest with a header row plus `rows`.
    pub fn write_manifest(&self, rows: &[(&str, &str, &str)]) {
        let mut text = String::from("# dataset samples\ndataset_type\trole\tpath\n");
        for (dataset, role, path) in rows {
            text.push_str(&format!("{}\t{}\t{}\n", dataset, role, path));
        }
        fs::write(self.manifest_path(), text).expect("Failed to write manifest");
    }

    /// Rewrite the manifest without any row for `dataset_type`.
    pub fn drop_manifest_rows(&self, dataset_type: &str) {
        let rows: Vec<_> = DEFAULT_MANIFEST_ROWS
            .iter()
            .copied()
            .filter(|(d, _, _)| *d != dataset_type)
            .collect();
        self.write_manifest(&rows);
    }

    /// Overwrite a data file with bytes that are not NetCDF.
    pub fn corrupt(&self, path: &Path) {
        fs::write(path, b"definitely not netcdf").expect("Failed to corrupt fixture");
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_layout() {
        let repo = TestRepo::new();
        assert!(repo.config_path().exists());
        assert!(repo.manifest_path().exists());
        assert!(repo.wrf_path().exists());
        assert!(repo.emiss_path().exists());
        assert!(repo.root().join("data/boundaries/Fairbanks.txt").exists());
    }

    #[test]
    fn test_drop_manifest_rows() {
        let repo = TestRepo::new();
        repo.drop_manifest_rows("emiss");
        let text = fs::read_to_string(repo.manifest_path()).unwrap();
        assert!(!text.contains("emiss\t"));
        assert!(text.contains("wrf\tsample"));
    }

    #[test]
    fn test_wrf_fixture_is_readable() {
        let dir = crate::temp_test_dir();
        let path = dir.path().join("wrf.nc");
        write_wrf_fixture(&path, WrfFixture::default()).unwrap();

        let file = netcdf::open(&path).unwrap();
        assert_eq!(file.dimension("Time").unwrap().len(), 3);
        let u = file.variable("U10").unwrap();
        let values: Vec<f32> = u.get_values((0, .., ..)).unwrap();
        assert_eq!(values, create_u_wind_cube(8, 6, 1));
    }
}
