//! Metrics infrastructure for the GLIMS outline tools.
//!
//! This crate declares every metric the workspace emits as a structured
//! [`Metric`] constant and re-exports the `metrics` crate for convenience.
//! Recording is a no-op until a recorder is installed; [`InMemoryRecorder`]
//! collects everything for tests and the runner's `--metrics-out` export.
//!
//! # Example
//!
//! ```rust
//! use glims_metrics::{describe_metrics, metric_defs};
//!
//! // Initialize metric descriptions at startup
//! describe_metrics();
//!
//! metrics::counter!(metric_defs::CLEAN_ROWS_DROPPED.name, "stage" => "drop_empty_geometries")
//!     .increment(3);
//! ```
//!
//! # Metric Type
//!
//! ```rust
//! use glims_metrics::{Metric, MetricKind};
//! use metrics::Unit;
//!
//! const MY_COUNTER: Metric = Metric::counter("my.counter")
//!     .with_description("A counter metric")
//!     .with_unit(Unit::Count)
//!     .with_labels(&["stage"]);
//!
//! assert_eq!(MY_COUNTER.kind, MetricKind::Counter);
//! ```

pub use metrics;

pub mod export;

pub use export::{InMemoryRecorder, MetricsSnapshot};

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// Use the const constructors to declare metrics at compile time.
///
/// ```rust
/// use glims_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const FILES: Metric = Metric::counter("glims.fetch.files")
///     .with_description("Files downloaded")
///     .with_unit(Unit::Count);
///
/// assert_eq!(FILES.name, "glims.fetch.files");
/// assert_eq!(FILES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "glims.clean.rows_in").
    pub name: &'static str,
    /// The kind of metric (counter, gauge, histogram).
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    ///
    /// This should be called once at startup for each metric.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the workspace.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Cleaning Pipeline
    // ========================================================================

    /// Rows entering the cleaning pipeline.
    pub const CLEAN_ROWS_IN: Metric = Metric::counter("glims.clean.rows_in")
        .with_description("Rows entering the cleaning pipeline")
        .with_unit(Unit::Count);

    /// Rows leaving the cleaning pipeline.
    pub const CLEAN_ROWS_OUT: Metric = Metric::counter("glims.clean.rows_out")
        .with_description("Rows leaving the cleaning pipeline")
        .with_unit(Unit::Count);

    /// Rows removed by a cleaning stage.
    ///
    /// Labels: stage
    pub const CLEAN_ROWS_DROPPED: Metric = Metric::counter("glims.clean.rows_dropped")
        .with_description("Rows removed by a cleaning stage")
        .with_unit(Unit::Count)
        .with_labels(&["stage"]);

    /// Rows added by splitting multi-part geometries.
    pub const CLEAN_ROWS_EXPLODED: Metric = Metric::counter("glims.clean.rows_exploded")
        .with_description("Rows added by splitting multi-part geometries")
        .with_unit(Unit::Count);

    /// Geometries repaired with the zero-buffer fallback.
    pub const CLEAN_REPAIR_FALLBACKS: Metric = Metric::counter("glims.clean.repair_fallbacks")
        .with_description("Geometries repaired with the zero-buffer fallback")
        .with_unit(Unit::Count);

    // ========================================================================
    // Archive Fetching
    // ========================================================================

    /// Files downloaded from the dataset server.
    pub const FETCH_FILES: Metric = Metric::counter("glims.fetch.files")
        .with_description("Files downloaded from the dataset server")
        .with_unit(Unit::Count);

    /// Bytes downloaded from the dataset server.
    pub const FETCH_BYTES: Metric = Metric::counter("glims.fetch.bytes")
        .with_description("Bytes downloaded from the dataset server")
        .with_unit(Unit::Bytes);

    /// Archives extracted.
    pub const FETCH_ARCHIVES_EXTRACTED: Metric = Metric::counter("glims.fetch.archives_extracted")
        .with_description("Archives extracted")
        .with_unit(Unit::Count);

    // ========================================================================
    // Map Building
    // ========================================================================

    /// Polygons placed on a region map.
    ///
    /// Labels: region
    pub const MAP_POLYGONS: Metric = Metric::gauge("glims.map.polygons")
        .with_description("Polygons placed on a region map")
        .with_unit(Unit::Count)
        .with_labels(&["region"]);

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &CLEAN_ROWS_IN,
        &CLEAN_ROWS_OUT,
        &CLEAN_ROWS_DROPPED,
        &CLEAN_ROWS_EXPLODED,
        &CLEAN_REPAIR_FALLBACKS,
        &FETCH_FILES,
        &FETCH_BYTES,
        &FETCH_ARCHIVES_EXTRACTED,
        &MAP_POLYGONS,
    ];
}

/// Describes all metrics used in the workspace.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
