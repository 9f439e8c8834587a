//! Error types for rendering.

use std::path::PathBuf;

use quicklook_common::{BoundingBox, QuicklookError};
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Field '{field}' has a degenerate extent ({}, {}) - ({}, {})", extent.min_x, extent.min_y, extent.max_x, extent.max_y)]
    DegenerateExtent { field: String, extent: BoundingBox },

    #[error("Field '{0}' has no finite values")]
    NoData(String),

    #[error("Field '{field}' holds {len} values, expected {width}x{height}")]
    BadShape {
        field: String,
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<RenderError> for QuicklookError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Write { path, source } => QuicklookError::Io(std::io::Error::new(
                source.kind(),
                format!("{}: {}", path.display(), source),
            )),
            other => QuicklookError::Render(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_errors_keep_their_kind() {
        let err: QuicklookError = RenderError::NoData("emiss".into()).into();
        assert_eq!(err.kind(), "RenderError");
        assert!(err.to_string().contains("emiss"));
    }

    #[test]
    fn test_write_errors_become_io() {
        let err: QuicklookError = RenderError::Write {
            path: PathBuf::from("/ro/wind_h00.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(matches!(err, QuicklookError::Io(_)));
        assert!(err.to_string().contains("wind_h00.png"));
    }
}
