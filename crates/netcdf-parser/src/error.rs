//! Error types for NetCDF access.

use std::path::PathBuf;

use quicklook_common::QuicklookError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF access.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// The file could not be opened (missing, unreadable or not NetCDF)
    #[error("Failed to open NetCDF {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },

    /// Missing variable
    #[error("Variable '{variable}' not found in {}", path.display())]
    VariableNotFound { variable: String, path: PathBuf },

    /// A hyperslab request does not fit the variable's dimensions
    #[error("Invalid request for '{variable}': {message}")]
    InvalidShape {
        variable: String,
        shape: Vec<usize>,
        message: String,
    },

    /// Index past the end of a dimension
    #[error("Index {index} out of range for dimension '{dimension}' of '{variable}' (length {len})")]
    IndexOutOfRange {
        variable: String,
        dimension: String,
        index: usize,
        len: usize,
    },

    /// Data read failed after the file was opened (corrupt data)
    #[error("Failed to read '{variable}' from {}: {source}", path.display())]
    Read {
        variable: String,
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },
}

impl From<NetCdfError> for QuicklookError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::Open { path, source } => QuicklookError::DatasetOpen {
                path,
                message: source.to_string(),
            },
            NetCdfError::VariableNotFound { variable, path } => {
                QuicklookError::VariableNotFound { variable, path }
            }
            NetCdfError::InvalidShape {
                variable,
                shape,
                message,
            } => QuicklookError::ShapeMismatch {
                left: variable,
                right: message,
                left_shape: shape,
                right_shape: Vec::new(),
            },
            NetCdfError::IndexOutOfRange {
                variable,
                index,
                len,
                ..
            } => QuicklookError::IndexOutOfRange {
                variable,
                index,
                len,
            },
            NetCdfError::Read {
                variable,
                path,
                source,
            } => QuicklookError::DatasetOpen {
                path,
                message: format!("reading '{}': {}", variable, source),
            },
        }
    }
}
