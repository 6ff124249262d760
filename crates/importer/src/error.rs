//! Error types for import operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during an import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing variable: {0}")]
    MissingVariable(String),

    #[error("Missing dimension: {0}")]
    MissingDimension(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("No importer accepts: {}", .0.display())]
    NoImporter(PathBuf),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error(transparent)]
    Field(#[from] rainfield::FieldError),
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
