//! Error types for the quicklook pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using QuicklookError.
pub type QuicklookResult<T> = Result<T, QuicklookError>;

/// Primary error type for resolving, reading, deriving and rendering.
///
/// Every variant is terminal for the current invocation; nothing is retried.
#[derive(Debug, Error)]
pub enum QuicklookError {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No manifest entry for dataset '{dataset_type}' with role '{role}'")]
    ManifestLookup { dataset_type: String, role: String },

    #[error("Manifest entry {dataset_type}/{role} points at a missing file: {}", path.display())]
    MissingFile {
        dataset_type: String,
        role: String,
        path: PathBuf,
    },

    // === Data Errors ===
    #[error("Failed to open dataset {}: {message}", path.display())]
    DatasetOpen { path: PathBuf, message: String },

    #[error("Variable '{variable}' not found in {}", path.display())]
    VariableNotFound { variable: String, path: PathBuf },

    #[error("Shape mismatch: {left} has shape {left_shape:?}, {right} has shape {right_shape:?}")]
    ShapeMismatch {
        left: String,
        right: String,
        left_shape: Vec<usize>,
        right_shape: Vec<usize>,
    },

    #[error("Index {index} out of range for '{variable}' (length {len})")]
    IndexOutOfRange {
        variable: String,
        index: usize,
        len: usize,
    },

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuicklookError {
    /// Short name of the failure kind, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            QuicklookError::Config(_) => "ConfigError",
            QuicklookError::ManifestLookup { .. } => "ManifestLookupError",
            QuicklookError::MissingFile { .. } => "MissingFileError",
            QuicklookError::DatasetOpen { .. } => "DatasetOpenError",
            QuicklookError::VariableNotFound { .. } => "VariableNotFoundError",
            QuicklookError::ShapeMismatch { .. } => "ShapeMismatchError",
            QuicklookError::IndexOutOfRange { .. } => "IndexOutOfRangeError",
            QuicklookError::Render(_) => "RenderError",
            QuicklookError::Io(_) => "IoError",
        }
    }

    /// Process exit code for this failure kind. Never zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            QuicklookError::Config(_) => 2,
            QuicklookError::ManifestLookup { .. } => 3,
            QuicklookError::MissingFile { .. } => 4,
            QuicklookError::DatasetOpen { .. } => 5,
            QuicklookError::VariableNotFound { .. } => 6,
            QuicklookError::ShapeMismatch { .. } => 7,
            QuicklookError::IndexOutOfRange { .. } => 8,
            QuicklookError::Render(_) => 9,
            QuicklookError::Io(_) => 10,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        QuicklookError::Config(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        QuicklookError::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = vec![
            QuicklookError::config("x"),
            QuicklookError::ManifestLookup {
                dataset_type: "emiss".into(),
                role: "sample".into(),
            },
            QuicklookError::MissingFile {
                dataset_type: "wrf".into(),
                role: "sample".into(),
                path: PathBuf::from("/nope"),
            },
            QuicklookError::DatasetOpen {
                path: PathBuf::from("/nope"),
                message: "bad".into(),
            },
            QuicklookError::VariableNotFound {
                variable: "U10".into(),
                path: PathBuf::from("/a.nc"),
            },
            QuicklookError::ShapeMismatch {
                left: "U10".into(),
                right: "V10".into(),
                left_shape: vec![2, 2],
                right_shape: vec![2, 3],
            },
            QuicklookError::IndexOutOfRange {
                variable: "emiss".into(),
                index: 99,
                len: 25,
            },
            QuicklookError::render("blank"),
        ];

        let mut codes: Vec<u8> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_messages_name_the_resource() {
        let err = QuicklookError::ManifestLookup {
            dataset_type: "emiss".into(),
            role: "sample".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("emiss"));
        assert!(msg.contains("sample"));
        assert_eq!(err.kind(), "ManifestLookupError");

        let err = QuicklookError::IndexOutOfRange {
            variable: "emiss".into(),
            index: 99,
            len: 25,
        };
        assert!(err.to_string().contains("99"));
        assert!(err.to_string().contains("25"));
    }
}
