//! # Error Module
//!
//! Error types shared across the viewer. Only setup failures and malformed
//! input surface as errors; rejected block edits are reported as "no change"
//! by the editor and never reach this type.

use thiserror::Error;

/// Errors produced by the viewer core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewerError {
    /// A matrix inversion was requested for a matrix whose determinant is zero.
    #[error("matrix is singular (determinant is zero); inverse is undefined")]
    SingularMatrix,

    /// Transform parameters that would divide by zero (projection, look-at, rotation axis).
    #[error("degenerate transform parameters: {0}")]
    DegenerateTransform(&'static str),

    /// A uniform required by the shading stage could not be resolved during setup.
    #[error("failed to resolve uniform `{0}`")]
    MissingUniform(String),

    /// A frame was requested before the renderer bindings were resolved.
    #[error("renderer bindings have not been resolved; call bind first")]
    NotBound,

    /// An explicit height grid contained a column outside the allowed range.
    #[error("column ({x}, {z}) has height {height}, outside [{min}, {max}]")]
    InvalidHeight {
        /// Grid X coordinate of the offending column
        x: usize,
        /// Grid Z coordinate of the offending column
        z: usize,
        /// The rejected height
        height: u8,
        /// Lowest allowed height
        min: u8,
        /// Highest allowed height
        max: u8,
    },

    /// An explicit height grid was empty or not square.
    #[error("height grid must be a non-empty square, got {rows} rows")]
    InvalidGridSize {
        /// Number of rows supplied
        rows: usize,
    },

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type ViewerResult<T> = Result<T, ViewerError>;

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        ViewerError::Config(err.to_string())
    }
}
