//! The `clean` command: raw GeoJSON in, cleaned GeoJSON out.

use crate::RunnerError;
use glims_outlines::{read_geojson, write_geojson, CleanConfig, CleanReport, OutlineCleaner};
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration for cleaning a file.
#[derive(Debug, Clone)]
pub struct CleanCommandConfig {
    /// Raw GeoJSON FeatureCollection.
    pub input: PathBuf,
    /// Cleaned GeoJSON destination.
    pub output: PathBuf,
    /// Optional YAML file overriding [`CleanConfig`] fields.
    pub config: Option<PathBuf>,
}

/// Load a cleaning configuration; fields missing from the file keep their defaults.
pub fn load_clean_config(path: &Path) -> Result<CleanConfig, RunnerError> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(CleanConfig::default());
    }
    Ok(serde_yaml::from_str(&text)?)
}

/// Read, clean and write outlines.
pub fn run_clean(config: &CleanCommandConfig) -> Result<CleanReport, RunnerError> {
    let clean_config = match &config.config {
        Some(path) => load_clean_config(path)?,
        None => CleanConfig::default(),
    };

    let raw = read_geojson(&config.input)?;
    let (cleaned, report) = OutlineCleaner::new(clean_config).clean_with_report(&raw)?;
    write_geojson(&cleaned, &config.output)?;

    for stage in &report.stages {
        info!(
            "clean[{}]: {} -> {}",
            stage.stage, stage.rows_in, stage.rows_out
        );
    }
    info!(
        "clean: wrote {} outlines to {}",
        cleaned.len(),
        config.output.display()
    );
    Ok(report)
}
