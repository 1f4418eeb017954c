//! The `map` command: cleaned GeoJSON in, interactive HTML (or figure JSON) out.

use crate::RunnerError;
use glims_map::{
    build_region_figure, default_regions, load_regions, render_html, Figure, FigureOptions,
};
use glims_outlines::read_geojson;
use std::path::PathBuf;
use tracing::info;

/// Configuration for building a map.
#[derive(Debug, Clone, Default)]
pub struct MapCommandConfig {
    /// Cleaned GeoJSON FeatureCollection.
    pub input: PathBuf,
    /// HTML (or JSON) destination.
    pub output: PathBuf,
    /// Optional YAML region list replacing the defaults.
    pub regions: Option<PathBuf>,
    /// Figure settings.
    pub options: FigureOptions,
    /// Write plotly figure JSON instead of HTML.
    pub json: bool,
}

/// Build and write the region map.
pub fn run_map(config: &MapCommandConfig) -> Result<Figure, RunnerError> {
    let regions = match &config.regions {
        Some(path) => load_regions(path)?,
        None => default_regions(),
    };
    if regions.is_empty() {
        return Err(RunnerError::ConfigError("region list is empty".to_string()));
    }

    let outlines = read_geojson(&config.input)?;
    let figure = build_region_figure(&outlines, &regions, &config.options)?;

    let body = if config.json {
        figure.to_json()?
    } else {
        render_html(&figure)?
    };
    std::fs::write(&config.output, body)?;

    info!(
        "map: {} regions written to {}",
        figure.data.len(),
        config.output.display()
    );
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_region_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let regions = dir.path().join("regions.yaml");
        std::fs::write(&regions, "[]\n").unwrap();

        let config = MapCommandConfig {
            input: dir.path().join("unused.geojson"),
            output: dir.path().join("map.html"),
            regions: Some(regions),
            ..MapCommandConfig::default()
        };
        assert!(matches!(run_map(&config), Err(RunnerError::ConfigError(_))));
    }
}
