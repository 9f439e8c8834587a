//! NetCDF dataset access for the quicklook pipeline.
//!
//! Datasets are opened read-only through the `netcdf` crate (libnetcdf +
//! HDF5). Opening reads the header only; arrays are read a plane at a time
//! so that a multi-gigabyte WRF or IOAPI file never has to be loaded whole.
//!
//! # Example
//!
//! ```no_run
//! use netcdf_parser::open_dataset;
//!
//! let ds = open_dataset("samples/wrf/wrfout_d01.nc")?;
//! let info = ds.variable("U10")?;
//! assert_eq!(info.shape().len(), 3);
//! let u = ds.read_plane("U10", &[0])?;
//! # Ok::<(), netcdf_parser::NetCdfError>(())
//! ```

mod error;
mod handle;
pub mod native;

pub use error::{NetCdfError, NetCdfResult};
pub use handle::{open_dataset, with_dataset, ArrayHandle, DimensionInfo, VariableInfo};
pub use native::silence_hdf5_errors;
