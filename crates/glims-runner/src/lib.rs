//! Library side of the `glims` command line tool.
//!
//! Each subcommand has a config struct and a `run_*` function so it can be
//! driven from tests without going through argument parsing.

pub mod clean;
mod error;
pub mod fetch;
pub mod logging;
pub mod map;
pub mod metrics_export;
pub mod paths;

pub use clean::{load_clean_config, run_clean, CleanCommandConfig};
pub use error::RunnerError;
pub use fetch::{run_fetch, FetchConfig, FetchSummary};
pub use logging::init_logging;
pub use map::{run_map, MapCommandConfig};
pub use metrics_export::{install_recorder, write_metrics};
