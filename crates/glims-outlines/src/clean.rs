//! Cleaning pipeline for GLIMS glacier outlines.
//!
//! [`OutlineCleaner::clean`] runs these stages in order:
//!
//! 1. [`keep_outlines`] - keep glacier boundaries only
//! 2. [`drop_empty_geometries`] - remove null and empty geometries
//! 3. [`parse_analysis_time`] - normalize the analysis timestamp to UTC
//! 4. [`ensure_crs`] - assign EPSG:4326 when the table has no CRS
//! 5. [`fix_invalid_geometries`] - repair geometries, then drop empties again
//! 6. [`explode_multipolygons`] - one row per polygon part
//! 7. [`filter_positive_area`] - keep rows with a positive area
//! 8. [`cast_categories`] - tag descriptive columns as categorical
//! 9. [`drop_exact_duplicates`] - same id, time and geometry
//! 10. [`reset_index`] - renumber rows from zero
//!
//! Every stage is a free function that consumes a table and returns a new
//! one, and is a no-op when the column it works on is absent.

use crate::engine::{GeoEngine, GeometryEngine};
use crate::table::{Crs, Outline, OutlineTable, WGS84_EPSG};
use crate::value::{Value, ValueKey, ValueKind};
use crate::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use geo::{Geometry, HasDimensions, MultiPolygon};
use glims_metrics::metric_defs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Line type marking a glacier boundary in GLIMS.
pub const GLACIER_BOUNDARY: &str = "glac_bound";

/// Descriptive GLIMS columns cast to categorical by default.
pub const DEFAULT_CATEGORICAL_COLUMNS: &[&str] = &[
    "primeclass",
    "surge_type",
    "term_type",
    "gtnq1reg",
    "gtnq2reg",
    "rgi_gl_typ",
    "conn_lvl",
];

// ============================================================================
// Configuration
// ============================================================================

/// Column names and constants used by the pipeline.
///
/// Deserializes from a partial YAML document; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Column holding the line classification.
    pub line_type_column: String,
    /// Classification value to keep.
    pub boundary_value: String,
    /// Column holding the analysis timestamp.
    pub time_column: String,
    /// Column holding the glacier area.
    pub area_column: String,
    /// Column holding the glacier identifier.
    pub id_column: String,
    /// EPSG code assigned when the input has no CRS.
    pub default_epsg: u32,
    /// Columns tagged categorical when present.
    pub categorical_columns: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            line_type_column: "line_type".to_string(),
            boundary_value: GLACIER_BOUNDARY.to_string(),
            time_column: "anlys_time".to_string(),
            area_column: "area".to_string(),
            id_column: "glac_id".to_string(),
            default_epsg: WGS84_EPSG,
            categorical_columns: DEFAULT_CATEGORICAL_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ============================================================================
// Stages and Report
// ============================================================================

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Keep rows with the boundary line type.
    KeepOutlines,
    /// Drop null or empty geometries.
    DropEmptyGeometries,
    /// Parse the analysis timestamp.
    ParseAnalysisTime,
    /// Assign a default CRS.
    EnsureCrs,
    /// Repair invalid geometries.
    FixInvalidGeometries,
    /// Split multi-part geometries.
    ExplodeMultipolygons,
    /// Keep rows with positive area.
    FilterPositiveArea,
    /// Tag categorical columns.
    CastCategories,
    /// Drop exact duplicates.
    DropExactDuplicates,
    /// Renumber rows.
    ResetIndex,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 10] = [
        Stage::KeepOutlines,
        Stage::DropEmptyGeometries,
        Stage::ParseAnalysisTime,
        Stage::EnsureCrs,
        Stage::FixInvalidGeometries,
        Stage::ExplodeMultipolygons,
        Stage::FilterPositiveArea,
        Stage::CastCategories,
        Stage::DropExactDuplicates,
        Stage::ResetIndex,
    ];

    /// Stage name as used in logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::KeepOutlines => "keep_outlines",
            Stage::DropEmptyGeometries => "drop_empty_geometries",
            Stage::ParseAnalysisTime => "parse_analysis_time",
            Stage::EnsureCrs => "ensure_crs",
            Stage::FixInvalidGeometries => "fix_invalid_geometries",
            Stage::ExplodeMultipolygons => "explode_multipolygons",
            Stage::FilterPositiveArea => "filter_positive_area",
            Stage::CastCategories => "cast_categories",
            Stage::DropExactDuplicates => "drop_exact_duplicates",
            Stage::ResetIndex => "reset_index",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row counts around one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageCount {
    /// The stage.
    pub stage: Stage,
    /// Rows before the stage ran.
    pub rows_in: usize,
    /// Rows after the stage ran.
    pub rows_out: usize,
}

/// Per-stage row counts of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Counts in execution order.
    pub stages: Vec<StageCount>,
}

impl CleanReport {
    /// Rows entering the pipeline.
    pub fn rows_in(&self) -> usize {
        self.stages.first().map(|s| s.rows_in).unwrap_or(0)
    }

    /// Rows leaving the pipeline.
    pub fn rows_out(&self) -> usize {
        self.stages.last().map(|s| s.rows_out).unwrap_or(0)
    }

    /// Counts for one stage.
    pub fn stage(&self, stage: Stage) -> Option<&StageCount> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Rows removed by a stage (zero for stages that only add rows).
    pub fn dropped(&self, stage: Stage) -> usize {
        self.stage(stage)
            .map(|s| s.rows_in.saturating_sub(s.rows_out))
            .unwrap_or(0)
    }
}

// ============================================================================
// Cleaner
// ============================================================================

/// Runs the cleaning stages with a configuration and a geometry engine.
#[derive(Debug, Clone, Default)]
pub struct OutlineCleaner<E = GeoEngine> {
    config: CleanConfig,
    engine: E,
}

impl OutlineCleaner<GeoEngine> {
    /// Create a cleaner with the default geometry engine.
    pub fn new(config: CleanConfig) -> Self {
        Self {
            config,
            engine: GeoEngine,
        }
    }
}

impl<E: GeometryEngine> OutlineCleaner<E> {
    /// Create a cleaner with a custom geometry engine.
    pub fn with_engine(config: CleanConfig, engine: E) -> Self {
        Self { config, engine }
    }

    /// The configuration in use.
    pub fn config(&self) -> &CleanConfig {
        &self.config
    }

    /// Clean a table. The input is left untouched.
    pub fn clean(&self, table: &OutlineTable) -> Result<OutlineTable> {
        self.clean_with_report(table).map(|(cleaned, _)| cleaned)
    }

    /// Clean a table and report the row counts around every stage.
    pub fn clean_with_report(&self, table: &OutlineTable) -> Result<(OutlineTable, CleanReport)> {
        let cfg = &self.config;
        let mut report = CleanReport::default();
        let mut table = table.clone();

        metrics::counter!(metric_defs::CLEAN_ROWS_IN.name).increment(table.len() as u64);

        table = run_stage(Stage::KeepOutlines, table, &mut report, |t| {
            Ok(keep_outlines(t, &cfg.line_type_column, &cfg.boundary_value))
        })?;
        table = run_stage(Stage::DropEmptyGeometries, table, &mut report, |t| {
            Ok(drop_empty_geometries(t))
        })?;
        table = run_stage(Stage::ParseAnalysisTime, table, &mut report, |t| {
            Ok(parse_analysis_time(t, &cfg.time_column))
        })?;
        table = run_stage(Stage::EnsureCrs, table, &mut report, |t| {
            Ok(ensure_crs(t, cfg.default_epsg))
        })?;
        table = run_stage(Stage::FixInvalidGeometries, table, &mut report, |t| {
            fix_invalid_geometries(t, &self.engine)
        })?;
        table = run_stage(Stage::ExplodeMultipolygons, table, &mut report, |t| {
            Ok(explode_multipolygons(t))
        })?;
        table = run_stage(Stage::FilterPositiveArea, table, &mut report, |t| {
            Ok(filter_positive_area(t, &cfg.area_column))
        })?;
        table = run_stage(Stage::CastCategories, table, &mut report, |t| {
            Ok(cast_categories(t, &cfg.categorical_columns))
        })?;
        table = run_stage(Stage::DropExactDuplicates, table, &mut report, |t| {
            drop_exact_duplicates(t, &cfg.id_column, &cfg.time_column, &self.engine)
        })?;
        table = run_stage(Stage::ResetIndex, table, &mut report, |t| Ok(reset_index(t)))?;

        metrics::counter!(metric_defs::CLEAN_ROWS_OUT.name).increment(table.len() as u64);
        info!(
            "OutlineCleaner: {} rows in, {} rows out",
            report.rows_in(),
            report.rows_out()
        );

        Ok((table, report))
    }
}

/// Clean a table with the default configuration and geometry engine.
pub fn clean(table: &OutlineTable) -> Result<OutlineTable> {
    OutlineCleaner::new(CleanConfig::default()).clean(table)
}

fn run_stage<F>(
    stage: Stage,
    table: OutlineTable,
    report: &mut CleanReport,
    f: F,
) -> Result<OutlineTable>
where
    F: FnOnce(OutlineTable) -> Result<OutlineTable>,
{
    let rows_in = table.len();
    let table = f(table)?;
    let rows_out = table.len();

    debug!("OutlineCleaner[{}]: {} -> {} rows", stage, rows_in, rows_out);
    if rows_out < rows_in {
        metrics::counter!(metric_defs::CLEAN_ROWS_DROPPED.name, "stage" => stage.as_str())
            .increment((rows_in - rows_out) as u64);
    } else if rows_out > rows_in {
        metrics::counter!(metric_defs::CLEAN_ROWS_EXPLODED.name)
            .increment((rows_out - rows_in) as u64);
    }

    report.stages.push(StageCount {
        stage,
        rows_in,
        rows_out,
    });
    Ok(table)
}

// ============================================================================
// Stage Functions
// ============================================================================

/// Keep rows whose line type equals `value`.
///
/// No-op if `column` is absent.
pub fn keep_outlines(mut table: OutlineTable, column: &str, value: &str) -> OutlineTable {
    let Some(pos) = table.schema().position(column) else {
        return table;
    };
    table.retain(|row| row.values[pos].as_str() == Some(value));
    table
}

/// Drop rows with a null geometry or a geometry with empty extent.
pub fn drop_empty_geometries(mut table: OutlineTable) -> OutlineTable {
    table.retain(|row| row.geometry.as_ref().is_some_and(|g| !g.is_empty()));
    table
}

/// Parse `column` into UTC timestamps, dropping rows that fail to parse.
///
/// No-op if `column` is absent.
pub fn parse_analysis_time(mut table: OutlineTable, column: &str) -> OutlineTable {
    let Some(pos) = table.schema().position(column) else {
        return table;
    };

    let before = table.len();
    for row in table.rows_mut() {
        row.values[pos] = Value::from(parse_timestamp(&row.values[pos]));
    }
    table.retain(|row| !row.values[pos].is_null());

    if let Some(def) = table.schema_mut().get_mut(column) {
        def.kind = ValueKind::Timestamp;
    }
    if table.len() < before {
        debug!(
            "OutlineCleaner[{}]: {} unparseable timestamps in '{}'",
            Stage::ParseAnalysisTime,
            before - table.len(),
            column
        );
    }
    table
}

/// Assign `EPSG:<epsg>` when the table has no CRS. Coordinates are not changed.
pub fn ensure_crs(mut table: OutlineTable, epsg: u32) -> OutlineTable {
    if table.crs().is_none() {
        table.set_crs(Some(Crs::Epsg(epsg)));
    }
    table
}

/// Repair every geometry, then drop geometries that became empty.
///
/// Polygons the engine reports valid are left as they are. Anything else goes
/// through the engine's `make_valid`; if that fails the geometry is buffered
/// by zero instead. Only a failure of both is returned.
pub fn fix_invalid_geometries<E>(mut table: OutlineTable, engine: &E) -> Result<OutlineTable>
where
    E: GeometryEngine + ?Sized,
{
    let mut fallbacks = 0u64;

    for row in table.rows_mut() {
        let Some(geometry) = row.geometry.as_ref() else {
            continue;
        };
        let areal = matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_));
        if areal && engine.is_valid(geometry) {
            continue;
        }
        let repaired = match engine.make_valid(geometry) {
            Ok(repaired) => repaired,
            Err(err) => {
                debug!(
                    "OutlineCleaner[{}]: row {} make_valid failed ({}), buffering by zero",
                    Stage::FixInvalidGeometries,
                    row.index,
                    err
                );
                fallbacks += 1;
                engine.buffer_zero(geometry)?
            }
        };
        let mut parts = repaired.0;
        row.geometry = Some(if parts.len() == 1 {
            Geometry::Polygon(parts.remove(0))
        } else {
            Geometry::MultiPolygon(MultiPolygon::new(parts))
        });
    }

    if fallbacks > 0 {
        warn!(
            "OutlineCleaner[{}]: {} geometries repaired with zero buffer",
            Stage::FixInvalidGeometries,
            fallbacks
        );
        metrics::counter!(metric_defs::CLEAN_REPAIR_FALLBACKS.name).increment(fallbacks);
    }

    Ok(drop_empty_geometries(table))
}

/// Split multi-part geometries into one row per part.
///
/// Parts inherit the row label and all attribute values of their source row.
/// Collections are split into their members. A multi-part geometry with no
/// parts produces no rows.
pub fn explode_multipolygons(mut table: OutlineTable) -> OutlineTable {
    let rows = table.take_rows();
    let mut exploded = Vec::with_capacity(rows.len());

    for row in rows {
        let parts: Vec<Geometry<f64>> = match row.geometry {
            Some(Geometry::MultiPolygon(mp)) => mp.0.into_iter().map(Geometry::Polygon).collect(),
            Some(Geometry::MultiLineString(ml)) => {
                ml.0.into_iter().map(Geometry::LineString).collect()
            }
            Some(Geometry::MultiPoint(mp)) => mp.0.into_iter().map(Geometry::Point).collect(),
            Some(Geometry::GeometryCollection(gc)) => gc.0,
            other => {
                exploded.push(Outline {
                    geometry: other,
                    ..row
                });
                continue;
            }
        };

        for part in parts {
            exploded.push(Outline {
                index: row.index,
                geometry: Some(part),
                values: row.values.clone(),
            });
        }
    }

    table.restore_rows(exploded);
    table
}

/// Keep rows whose `column` value is a number strictly greater than zero.
///
/// Missing and non-numeric values are dropped. No-op if `column` is absent.
pub fn filter_positive_area(mut table: OutlineTable, column: &str) -> OutlineTable {
    let Some(pos) = table.schema().position(column) else {
        return table;
    };
    table.retain(|row| row.values[pos].as_f64().is_some_and(|area| area > 0.0));
    table
}

/// Tag every listed column that exists as categorical.
pub fn cast_categories<S: AsRef<str>>(mut table: OutlineTable, columns: &[S]) -> OutlineTable {
    for name in columns {
        if let Some(def) = table.schema_mut().get_mut(name.as_ref()) {
            def.categorical = true;
        }
    }
    table
}

/// Drop rows repeating an earlier row's identifier, timestamp and geometry.
///
/// The timestamp only takes part when `time_column` exists. The first row in
/// current order is kept. No-op if `id_column` is absent.
pub fn drop_exact_duplicates<E>(
    mut table: OutlineTable,
    id_column: &str,
    time_column: &str,
    engine: &E,
) -> Result<OutlineTable>
where
    E: GeometryEngine + ?Sized,
{
    let Some(id_pos) = table.schema().position(id_column) else {
        return Ok(table);
    };
    let time_pos = table.schema().position(time_column);

    let mut keys = Vec::with_capacity(table.len());
    for row in table.rows() {
        let geometry = match &row.geometry {
            Some(g) => Some(engine.canonical_bytes(g)?),
            None => None,
        };
        keys.push(RowKey {
            id: row.values[id_pos].key(),
            time: time_pos.map(|p| row.values[p].key()),
            geometry,
        });
    }

    let mut seen = HashSet::with_capacity(keys.len());
    let mut keep = keys.into_iter().map(|key| seen.insert(key));
    table.retain(|_| keep.next().unwrap_or(true));
    Ok(table)
}

/// Renumber row labels from zero in current order.
pub fn reset_index(mut table: OutlineTable) -> OutlineTable {
    for (i, row) in table.rows_mut().iter_mut().enumerate() {
        row.index = i;
    }
    table
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct RowKey {
    id: ValueKey,
    time: Option<ValueKey>,
    geometry: Option<Vec<u8>>,
}

// ============================================================================
// Timestamp Parsing
// ============================================================================

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Coerce a cell to a UTC timestamp.
///
/// Text is parsed as RFC 3339, as a date-time with an offset, as a naive
/// date-time (taken as UTC) or as a date (midnight UTC). Timestamps pass
/// through. Anything else yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Text(text) => parse_timestamp_str(text),
        other => other.as_timestamp(),
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(text, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
