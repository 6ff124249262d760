//! Error types for the rain-field model.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors raised when constructing or validating rain fields.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Value count {actual} does not match grid shape {rows}x{cols}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        actual: usize,
    },

    #[error("Quality count {actual} does not match grid shape {rows}x{cols}")]
    QualityShapeMismatch {
        rows: usize,
        cols: usize,
        actual: usize,
    },

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Unknown precipitation unit: {0}")]
    UnknownUnit(String),

    #[error("Unknown value transform: {0}")]
    UnknownTransform(String),

    #[error("Unknown precision: {0}. Expected 'single' or 'double'")]
    UnknownPrecision(String),

    #[error("Unknown y origin: {0}. Expected 'upper' or 'lower'")]
    UnknownYOrigin(String),
}
