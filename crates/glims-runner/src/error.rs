//! Error type for the runner.

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Fetch error: {0}")]
    FetchError(#[from] glims_fetch::FetchError),

    #[error("Outline error: {0}")]
    OutlineError(#[from] glims_outlines::OutlineError),

    #[error("Map error: {0}")]
    MapError(#[from] glims_map::MapError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
