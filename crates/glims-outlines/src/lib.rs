//! # glims-outlines
//!
//! Cleaning of raw GLIMS glacier outline collections into analysis-ready
//! tables.
//!
//! GLIMS exports mix glacier boundaries with other line types (debris
//! cover, rock outcrops, centerlines), carry invalid and multi-part
//! polygons, store the analysis time as text, and sometimes repeat the
//! same outline. This crate provides:
//!
//! - [`OutlineTable`]: an ordered set of rows, each a geometry plus named
//!   attribute values, with a column [`Schema`] and an optional [`Crs`]
//! - [`OutlineCleaner`]: the ten-stage cleaning pipeline, also exposed as
//!   individual stage functions in [`clean`](mod@clean)
//! - [`GeometryEngine`]: the geometry repair and encoding seam, with
//!   [`GeoEngine`] as the default implementation
//! - GeoJSON loading and saving via [`read_geojson`] and [`write_geojson`]
//!
//! ## Example
//!
//! ```no_run
//! use glims_outlines::{read_geojson, write_geojson, CleanConfig, OutlineCleaner};
//!
//! let raw = read_geojson("data/raw/glims_north.geojson")?;
//!
//! let cleaner = OutlineCleaner::new(CleanConfig::default());
//! let (cleaned, report) = cleaner.clean_with_report(&raw)?;
//! println!("{} -> {} outlines", report.rows_in(), report.rows_out());
//!
//! write_geojson(&cleaned, "data/clean/glims_north.geojson")?;
//! # Ok::<(), glims_outlines::OutlineError>(())
//! ```
//!
//! ## Building a table by hand
//!
//! ```
//! use geo::polygon;
//! use glims_outlines::{clean, OutlineTable, Value};
//!
//! let mut table = OutlineTable::default();
//! table.insert(
//!     Some(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)].into()),
//!     [("line_type", Value::from("glac_bound")), ("area", Value::from(0.5))],
//! );
//!
//! let cleaned = clean(&table)?;
//! assert_eq!(cleaned.len(), 1);
//! assert_eq!(cleaned.crs().and_then(|c| c.epsg()), Some(4326));
//! # Ok::<(), glims_outlines::OutlineError>(())
//! ```

pub mod clean;
mod engine;
mod error;
mod io;
mod schema;
mod table;
mod value;

pub use clean::{
    clean, CleanConfig, CleanReport, OutlineCleaner, Stage, StageCount,
    DEFAULT_CATEGORICAL_COLUMNS, GLACIER_BOUNDARY,
};
pub use engine::{GeoEngine, GeometryEngine};
pub use error::OutlineError;
pub use io::{
    parse_geojson, read_geojson, to_feature_collection, to_geojson_string, write_geojson,
};
pub use schema::{ColumnDef, Schema};
pub use table::{Crs, Outline, OutlineTable, WGS84_EPSG};
pub use value::{Value, ValueKind};

/// Result type for outline operations.
pub type Result<T> = std::result::Result<T, OutlineError>;
