//! Error handling for imxdiff-reader
//!
//! Wraps imxdiff-core ExError with reader-specific helpers

use imxdiff_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create an XML parse error
pub fn parse_error(path: Option<&Path>, err: roxmltree::Error) -> ExError {
    let ex = ExError::new(ExErrorKind::Parse)
        .with_op("parse")
        .with_message(err.to_string());
    match path {
        Some(path) => ex.with_path(path.display().to_string()),
        None => ex,
    }
}

/// Create a missing schema version error
pub fn missing_version(path: Option<&Path>) -> ExError {
    let ex = ExError::new(ExErrorKind::MissingVersion)
        .with_op("parse")
        .with_message("Document declares no imxVersion");
    match path {
        Some(path) => ex.with_path(path.display().to_string()),
        None => ex,
    }
}

/// Create an error for a directory holding no documents
pub fn empty_container(path: &Path) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("load_container")
        .with_path(path.display().to_string())
        .with_message("Container holds no XML documents")
}

/// Create an error for a situation the document does not contain
pub fn missing_situation(path: Option<&Path>, situation: &str) -> ExError {
    let ex = ExError::new(ExErrorKind::NotFound)
        .with_op("load_situation")
        .with_message(format!("Document has no {}", situation));
    match path {
        Some(path) => ex.with_path(path.display().to_string()),
        None => ex,
    }
}
