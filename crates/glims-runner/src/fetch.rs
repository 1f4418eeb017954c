//! The `fetch` command: download and unpack a GLIMS release.

use crate::paths::{data_base, resolve_data_dir};
use crate::RunnerError;
use glims_fetch::{unzip_to, DownloadStats, GlimsFetcher, Netrc, ReleaseDate};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Netrc file looked up at the data base directory when none is given.
pub const DEFAULT_NETRC: &str = "_netrc";

/// Configuration for fetching a release.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Release date stamp (YYYYMMDD).
    pub date: String,
    /// Download directory; relative paths resolve against the repository root.
    pub raw_dir: PathBuf,
    /// Extraction directory; relative paths resolve against the repository root.
    pub extract_dir: PathBuf,
    /// Netrc file with Earthdata credentials.
    pub netrc: Option<PathBuf>,
    /// Check archives against their MD5 companions.
    pub verify: bool,
    /// Override for the dataset directory URL.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            date: String::new(),
            raw_dir: PathBuf::from("data/raw/glims_v1"),
            extract_dir: PathBuf::from("data/raw/glims_v1/extracted"),
            netrc: None,
            verify: true,
            base_url: None,
            timeout_secs: glims_fetch::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// What a fetch produced.
#[derive(Debug, Clone)]
pub struct FetchSummary {
    /// Downloaded (or already present) files in target order.
    pub files: Vec<PathBuf>,
    /// Extraction directories.
    pub extracted: Vec<PathBuf>,
    /// Download statistics.
    pub stats: DownloadStats,
}

/// Download, verify and unpack a release.
pub fn run_fetch(config: &FetchConfig, cwd: &Path) -> Result<FetchSummary, RunnerError> {
    let date = ReleaseDate::parse(&config.date)?;
    let raw_dir = resolve_data_dir(&config.raw_dir, cwd);
    let extract_dir = resolve_data_dir(&config.extract_dir, cwd);

    let mut fetcher =
        GlimsFetcher::with_timeout(&raw_dir, Duration::from_secs(config.timeout_secs))?
            .with_verify(config.verify);
    if let Some(base_url) = &config.base_url {
        fetcher = fetcher.with_base_url(base_url)?;
    }
    if let Some(netrc) = load_netrc(config.netrc.as_deref(), cwd)? {
        fetcher = fetcher.with_netrc(netrc);
    }

    let files = fetcher.fetch(&date)?;
    let extracted = unzip_to(&files, &extract_dir)?;
    let stats = fetcher.download_stats();

    info!(
        "fetch[{}]: {} files in {}, {} archives in {}",
        date,
        files.len(),
        raw_dir.display(),
        extracted.len(),
        extract_dir.display()
    );
    Ok(FetchSummary {
        files,
        extracted,
        stats,
    })
}

/// Load credentials from an explicit netrc, or from `_netrc` at the data
/// base directory when present.
fn load_netrc(explicit: Option<&Path>, cwd: &Path) -> Result<Option<Netrc>, RunnerError> {
    if let Some(path) = explicit {
        return Ok(Some(Netrc::from_file(path)?));
    }
    let fallback = data_base(cwd).join(DEFAULT_NETRC);
    if fallback.is_file() {
        return Ok(Some(Netrc::from_file(fallback)?));
    }
    warn!("fetch: no netrc found, requests will be anonymous");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_rejected_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            date: "2026-01-14".to_string(),
            raw_dir: dir.path().join("raw"),
            ..FetchConfig::default()
        };
        let err = run_fetch(&config, dir.path()).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::FetchError(glims_fetch::FetchError::InvalidDate(_))
        ));
        assert!(!dir.path().join("raw").exists());
    }

    #[test]
    fn test_load_netrc_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        assert!(load_netrc(None, &root).unwrap().is_none());

        std::fs::write(
            root.join(DEFAULT_NETRC),
            "machine urs.earthdata.nasa.gov login u password p\n",
        )
        .unwrap();
        let netrc = load_netrc(None, &root).unwrap().unwrap();
        assert!(netrc.credentials_for("urs.earthdata.nasa.gov").is_some());
    }

    #[test]
    fn test_explicit_netrc_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(load_netrc(Some(missing.as_path()), dir.path()).is_err());
    }
}
