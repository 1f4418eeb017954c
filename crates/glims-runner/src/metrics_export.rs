//! Collecting metrics for a command run and writing them as JSON.

use crate::RunnerError;
use glims_metrics::{describe_metrics, metrics, InMemoryRecorder};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Install a fresh in-memory recorder as the global recorder.
///
/// Returns `None` if a global recorder was already installed.
pub fn install_recorder() -> Option<Arc<InMemoryRecorder>> {
    let recorder = Arc::new(InMemoryRecorder::new());
    match metrics::set_global_recorder(recorder.clone()) {
        Ok(()) => {
            describe_metrics();
            Some(recorder)
        }
        Err(_) => {
            warn!("metrics: a global recorder is already installed");
            None
        }
    }
}

/// Write a snapshot of every recorded metric to `path`.
pub fn write_metrics(recorder: &InMemoryRecorder, path: &Path) -> Result<(), RunnerError> {
    let snapshot = recorder.snapshot();
    std::fs::write(path, snapshot.to_json()?)?;
    info!(
        "metrics: wrote {} metrics to {}",
        snapshot.metrics.len(),
        path.display()
    );
    Ok(())
}
