//! `glims`: fetch, clean and map GLIMS glacier outlines.

use clap::{Args, Parser, Subcommand};
use glims_map::{FigureOptions, DEFAULT_BASEMAP, DEFAULT_MAX_POLYS, DEFAULT_PAD};
use glims_runner::{
    init_logging, install_recorder, run_clean, run_fetch, run_map, write_metrics,
    CleanCommandConfig, FetchConfig, MapCommandConfig, RunnerError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "glims", version, about = "Fetch, clean and map GLIMS glacier outlines")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write the metrics recorded during the run to this JSON file
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download and unpack an NSIDC-0272 release
    Fetch(FetchArgs),
    /// Clean a raw outline GeoJSON file
    Clean(CleanArgs),
    /// Build an interactive region map from cleaned outlines
    Map(MapArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Release date stamp, e.g. 20260114
    #[arg(long)]
    date: String,

    /// Download directory (relative paths resolve against the repository root)
    #[arg(long, default_value = "data/raw/glims_v1")]
    raw_dir: PathBuf,

    /// Extraction directory (relative paths resolve against the repository root)
    #[arg(long, default_value = "data/raw/glims_v1/extracted")]
    extract_dir: PathBuf,

    /// Netrc file with Earthdata credentials (default: <repo>/_netrc)
    #[arg(long)]
    netrc: Option<PathBuf>,

    /// Skip MD5 verification of downloaded archives
    #[arg(long)]
    no_verify: bool,

    /// Dataset directory URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "300")]
    timeout: u64,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Raw GeoJSON FeatureCollection
    #[arg(short, long)]
    input: PathBuf,

    /// Cleaned GeoJSON destination
    #[arg(short, long)]
    output: PathBuf,

    /// YAML file overriding column names and defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Cleaned GeoJSON FeatureCollection
    #[arg(short, long)]
    input: PathBuf,

    /// HTML destination (figure JSON with --json)
    #[arg(short, long)]
    output: PathBuf,

    /// YAML region list replacing the built-in regions
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Region shown first
    #[arg(long)]
    start: Option<String>,

    /// Maximum polygons drawn per region
    #[arg(long, default_value_t = DEFAULT_MAX_POLYS)]
    max_polys: usize,

    /// Sampling seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Mapbox basemap style
    #[arg(long, default_value = DEFAULT_BASEMAP)]
    basemap: String,

    /// Write plotly figure JSON instead of HTML
    #[arg(long)]
    json: bool,
}

fn run(cli: Cli) -> Result<(), RunnerError> {
    match cli.command {
        Command::Fetch(args) => {
            let cwd = std::env::current_dir()?;
            let config = FetchConfig {
                date: args.date,
                raw_dir: args.raw_dir,
                extract_dir: args.extract_dir,
                netrc: args.netrc,
                verify: !args.no_verify,
                base_url: args.base_url,
                timeout_secs: args.timeout,
            };
            let summary = run_fetch(&config, &cwd)?;
            println!(
                "Fetched {} files ({} downloaded, {} bytes), extracted {} archives",
                summary.files.len(),
                summary.stats.files_downloaded,
                summary.stats.bytes_downloaded,
                summary.extracted.len()
            );
        }
        Command::Clean(args) => {
            let config = CleanCommandConfig {
                input: args.input,
                output: args.output,
                config: args.config,
            };
            let report = run_clean(&config)?;
            println!(
                "Cleaned {} -> {} outlines into {}",
                report.rows_in(),
                report.rows_out(),
                config.output.display()
            );
        }
        Command::Map(args) => {
            let config = MapCommandConfig {
                input: args.input,
                output: args.output,
                regions: args.regions,
                options: FigureOptions {
                    start: args.start,
                    max_polys: args.max_polys,
                    seed: args.seed,
                    basemap: args.basemap,
                    pad: DEFAULT_PAD,
                },
                json: args.json,
            };
            let figure = run_map(&config)?;
            println!(
                "Mapped regions [{}] into {}",
                figure.region_names().join(", "),
                config.output.display()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let metrics_out = cli.metrics_out.clone();
    let recorder = metrics_out.as_ref().and_then(|_| install_recorder());

    let result = run(cli).and_then(|()| match (&recorder, &metrics_out) {
        (Some(recorder), Some(path)) => write_metrics(recorder, path),
        _ => Ok(()),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
