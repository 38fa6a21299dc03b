//! Error types for the boundary core library.

/// Top-level error enum for the boundary core library.
///
/// Every per-file failure surfaces as one of these and is turned into a
/// logged skip by the assembler; only directory-level IO reaches callers.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("WKB error: {0}")]
    Wkb(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Map config error: {0}")]
    MapConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "gpkg")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<BoundaryError> for pyo3::PyErr {
    fn from(err: BoundaryError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};

        match &err {
            BoundaryError::Io(_) => PyIOError::new_err(err.to_string()),
            BoundaryError::Parse(_)
            | BoundaryError::Wkb(_)
            | BoundaryError::Projection(_)
            | BoundaryError::Json(_)
            | BoundaryError::MapConfig(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

pub type BoundaryResult<T> = Result<T, BoundaryError>;
