//! Error types for the outlines crate.

use thiserror::Error;

/// Errors that can occur when loading or cleaning glacier outlines.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GeoJSON syntax or structure error.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The GeoJSON document is not a FeatureCollection.
    #[error("Expected a GeoJSON FeatureCollection, got {0}")]
    NotFeatureCollection(String),

    /// A row does not have one value per schema column.
    #[error("Row has {actual} values but the schema has {expected} columns")]
    RowWidth {
        /// Number of schema columns.
        expected: usize,
        /// Number of values in the row.
        actual: usize,
    },

    /// The geometry engine has no repair for this geometry.
    #[error("Geometry repair unavailable: {0}")]
    RepairUnsupported(String),

    /// Geometry repair failed.
    #[error("Geometry repair failed: {0}")]
    RepairFailed(String),

    /// Canonical encoding of a geometry failed.
    #[error("Geometry encoding failed: {0}")]
    Encoding(String),
}
