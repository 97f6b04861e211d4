//! Error types for the SOFA reader.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SOFA operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required dataset or attribute is absent
    #[error("Required field missing: {0}")]
    RequiredFieldMissing(String),

    /// Root `DataType` has no registered payload constructor
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    /// Caller supplied neither a usable path nor an open container
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dataset node does not exist in the container
    #[error("Node not found: {0}")]
    NodeMissing(String),

    /// Attribute does not exist on the node (or the node does not exist)
    #[error("Attribute not found: {path}@{name}")]
    AttributeMissing { path: String, name: String },

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Read attempted on a container that was already closed
    #[error("Container is closed")]
    Closed,

    /// Malformed container contents
    #[error("Invalid container structure: {0}")]
    InvalidStructure(String),

    /// Stored value does not have the kind the field expects
    #[error("Type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HDF5 library error
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an attribute-missing error.
    pub fn attribute_missing(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AttributeMissing { path: path.into(), name: name.into() }
    }

    /// True for the "not found" failures a container reports.
    ///
    /// Only these may be downgraded to an absent optional field; every
    /// other variant is fatal regardless of field policy.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NodeMissing(_) | Self::AttributeMissing { .. })
    }
}

/// Result type alias for SOFA operations.
pub type Result<T> = std::result::Result<T, Error>;
