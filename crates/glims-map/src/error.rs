//! Error types for the map crate.

use thiserror::Error;

/// Errors that can occur when building region maps.
#[derive(Debug, Error)]
pub enum MapError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML region list error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error converting outlines.
    #[error("Outline error: {0}")]
    Outlines(#[from] glims_outlines::OutlineError),

    /// Region with an inverted or non-finite box.
    #[error("Invalid region '{0}': bounds must be finite with min <= max")]
    InvalidRegion(String),

    /// No region contains any outline.
    #[error("No outlines fall inside any of the {0} regions")]
    NoRegionData(usize),
}
