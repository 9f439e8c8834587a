//! Field derivation for quicklook plots.
//!
//! Raw variables are accessed through the [`GridSource`] trait, which
//! yields one `(y, x)` plane per time step. Two implementations exist:
//! [`Grid3D`] holds data in memory, [`NetCdfSource`] reads planes lazily
//! from an open dataset and can reduce a vertical level dimension.
//!
//! # Architecture
//!
//! ```text
//! ArrayHandle ──► NetCdfSource ─┐
//!                               ├─► wind_speed_10m / slice_hour ──► Field2D
//! Vec<f32>    ──► Grid3D ───────┘
//!
//! XLAT/XLONG  ──► LatLonGrid::extent / crop_center ──► BoundingBox
//! *.txt       ──► read_boundary ──► Outline
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{wind_speed_10m, NetCdfSource};
//!
//! let ds = netcdf_parser::open_dataset(path)?;
//! let u = NetCdfSource::new(&ds, "U10")?;
//! let v = NetCdfSource::new(&ds, "V10")?;
//! let speed = wind_speed_10m(&u, &v, 0)?;
//! ```

pub mod boundary;
pub mod coords;
pub mod derive;
pub mod source;

pub use boundary::{read_boundary, read_boundary_dir};
pub use coords::LatLonGrid;
pub use derive::{slice_hour, wind_speed_10m, wind_speed_10m_at_default, DEFAULT_TIME_INDEX};
pub use source::{Grid3D, GridSource, LevelReduction, NetCdfSource};
