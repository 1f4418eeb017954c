//! In-memory metrics recorder with a JSON snapshot export.
//!
//! The recorder keeps one atomic cell per metric key. A snapshot folds the
//! cells into a `{ total, labels: { key: { value: { total } } } }` tree per
//! metric name, so a counter recorded with a `stage` label can be read both
//! as an overall total and broken down per stage.

use metrics::atomics::AtomicU64;
use metrics::{
    Counter, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

/// Recorder that stores every metric in memory.
///
/// Install it globally with [`metrics::set_global_recorder`] (wrapped in an
/// `Arc` so it can still be read afterwards) or scope it to a closure with
/// [`metrics::with_local_recorder`].
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    counters: Mutex<BTreeMap<Key, Arc<AtomicU64>>>,
    gauges: Mutex<BTreeMap<Key, Arc<AtomicU64>>>,
    histograms: Mutex<BTreeMap<Key, Arc<HistogramCell>>>,
}

#[derive(Debug, Default)]
struct HistogramCell {
    samples: Mutex<Vec<f64>>,
}

impl HistogramFn for HistogramCell {
    fn record(&self, value: f64) {
        lock(&self.samples).push(value);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn labels_match(key: &Key, labels: &[(&str, &str)]) -> bool {
    key.labels().count() == labels.len()
        && labels
            .iter()
            .all(|(k, v)| key.labels().any(|l| l.key() == *k && l.value() == *v))
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter value for `name` with exactly these labels, 0 if never recorded.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        lock(&self.counters)
            .iter()
            .filter(|(key, _)| key.name() == name && labels_match(key, labels))
            .map(|(_, cell)| cell.load(Ordering::Acquire))
            .sum()
    }

    /// Counter value for `name` summed over every label set.
    pub fn counter_total(&self, name: &str) -> u64 {
        lock(&self.counters)
            .iter()
            .filter(|(key, _)| key.name() == name)
            .map(|(_, cell)| cell.load(Ordering::Acquire))
            .sum()
    }

    /// Gauge value for `name` with exactly these labels.
    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        lock(&self.gauges)
            .iter()
            .find(|(key, _)| key.name() == name && labels_match(key, labels))
            .map(|(_, cell)| f64::from_bits(cell.load(Ordering::Acquire)))
    }

    /// Fold every recorded metric into an exportable snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut metrics = BTreeMap::new();

        for (key, cell) in lock(&self.counters).iter() {
            let value = cell.load(Ordering::Acquire) as f64;
            let entry = metrics
                .entry(key.name().to_string())
                .or_insert_with(|| MetricEntry::new("counter"));
            entry.add(key, value);
        }
        for (key, cell) in lock(&self.gauges).iter() {
            let value = f64::from_bits(cell.load(Ordering::Acquire));
            let entry = metrics
                .entry(key.name().to_string())
                .or_insert_with(|| MetricEntry::new("gauge"));
            entry.add(key, value);
        }
        for (key, cell) in lock(&self.histograms).iter() {
            let samples = lock(&cell.samples);
            let entry = metrics
                .entry(key.name().to_string())
                .or_insert_with(|| MetricEntry::new("histogram"));
            entry.count += samples.len() as u64;
            entry.add(key, samples.iter().sum());
        }

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            metrics,
        }
    }
}

impl Recorder for InMemoryRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let cell = lock(&self.counters).entry(key.clone()).or_default().clone();
        Counter::from_arc(cell)
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        let cell = lock(&self.gauges)
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AtomicU64::new(0f64.to_bits())))
            .clone();
        Gauge::from_arc(cell)
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        let cell = lock(&self.histograms).entry(key.clone()).or_default().clone();
        Histogram::from_arc(cell)
    }
}

/// Point-in-time export of every recorded metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub metrics: BTreeMap<String, MetricEntry>,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One metric: its total and a breakdown per label key and value.
///
/// Histograms total the sum of their samples and also carry `count`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricEntry {
    pub kind: &'static str,
    pub total: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub count: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, BTreeMap<String, LabelTotal>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelTotal {
    pub total: f64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl MetricEntry {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            total: 0.0,
            count: 0,
            labels: BTreeMap::new(),
        }
    }

    fn add(&mut self, key: &Key, value: f64) {
        self.total += value;
        for label in key.labels() {
            self.labels
                .entry(label.key().to_string())
                .or_default()
                .entry(label.value().to_string())
                .or_default()
                .total += value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_by_label_and_total() {
        let recorder = InMemoryRecorder::new();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("rows", "stage" => "a").increment(2);
            metrics::counter!("rows", "stage" => "b").increment(3);
            metrics::counter!("rows", "stage" => "a").increment(1);
        });

        assert_eq!(recorder.counter("rows", &[("stage", "a")]), 3);
        assert_eq!(recorder.counter("rows", &[("stage", "b")]), 3);
        assert_eq!(recorder.counter("rows", &[]), 0);
        assert_eq!(recorder.counter_total("rows"), 6);
        assert_eq!(recorder.counter_total("missing"), 0);
    }

    #[test]
    fn test_gauge_set() {
        let recorder = InMemoryRecorder::new();
        metrics::with_local_recorder(&recorder, || {
            metrics::gauge!("polys", "region" => "Alps").set(4.0);
        });
        assert_eq!(recorder.gauge("polys", &[("region", "Alps")]), Some(4.0));
        assert_eq!(recorder.gauge("polys", &[("region", "Andes")]), None);
    }

    #[test]
    fn test_snapshot_json() {
        let recorder = InMemoryRecorder::new();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("rows", "stage" => "a").increment(2);
            metrics::counter!("rows", "stage" => "b").increment(5);
            metrics::histogram!("latency").record(1.5);
            metrics::histogram!("latency").record(2.5);
        });

        let snapshot = recorder.snapshot();
        let rows = &snapshot.metrics["rows"];
        assert_eq!(rows.kind, "counter");
        assert_eq!(rows.total, 7.0);
        assert_eq!(rows.labels["stage"]["b"].total, 5.0);
        let latency = &snapshot.metrics["latency"];
        assert_eq!(latency.count, 2);
        assert_eq!(latency.total, 4.0);

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["metrics"]["rows"]["labels"]["stage"]["a"]["total"], 2.0);
        assert!(value["metrics"]["rows"].get("count").is_none());
    }
}
