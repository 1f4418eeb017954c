//! NSIDC-0272 archive downloader.
//!
//! The NSIDC server redirects unauthenticated requests to the Earthdata
//! login host, which answers with a session cookie and redirects back. The
//! fetcher follows that chain itself and attaches basic auth per hop, only
//! for hosts the netrc has credentials for.
//!
//! Downloads are atomic: bytes go to `<name>.part`, which is renamed over
//! the final path once complete, or removed if the transfer fails. A final
//! file that already exists with a non-zero size is treated as done and never
//! re-downloaded.

use crate::checksum::verify_archive;
use crate::netrc::Netrc;
use crate::release::{targets_for_date, ReleaseDate, BASE_URL};
use crate::{FetchError, Result};
use glims_metrics::metric_defs;
use reqwest::blocking::{Client, Response};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Url;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Maximum redirects followed for one file.
pub const MAX_REDIRECTS: usize = 10;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Download statistics for the fetcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Number of files downloaded this session.
    pub files_downloaded: usize,
    /// Total bytes downloaded this session.
    pub bytes_downloaded: u64,
}

/// Downloads GLIMS release archives into a local directory.
pub struct GlimsFetcher {
    /// Directory receiving the archives.
    raw_dir: PathBuf,
    /// Directory URL the file names are appended to.
    base_url: Url,
    /// HTTP client without automatic redirects.
    client: Client,
    /// Earthdata credentials.
    netrc: Option<Netrc>,
    /// Whether zips are checked against their .md5 companions.
    verify: bool,
    files_downloaded: AtomicUsize,
    bytes_downloaded: AtomicU64,
}

impl std::fmt::Debug for GlimsFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlimsFetcher")
            .field("raw_dir", &self.raw_dir)
            .field("base_url", &self.base_url.as_str())
            .field("verify", &self.verify)
            .finish()
    }
}

impl GlimsFetcher {
    /// Create a fetcher against the public NSIDC server.
    pub fn new<P: AsRef<Path>>(raw_dir: P) -> Result<Self> {
        Self::with_timeout(raw_dir, DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout<P: AsRef<Path>>(raw_dir: P, timeout: Duration) -> Result<Self> {
        let raw_dir = raw_dir.as_ref().to_path_buf();
        fs::create_dir_all(&raw_dir)?;

        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            raw_dir,
            base_url: parse_base_url(BASE_URL)?,
            client,
            netrc: None,
            verify: true,
            files_downloaded: AtomicUsize::new(0),
            bytes_downloaded: AtomicU64::new(0),
        })
    }

    /// Use a different directory URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Use netrc credentials for authenticating hosts.
    pub fn with_netrc(mut self, netrc: Netrc) -> Self {
        self.netrc = Some(netrc);
        self
    }

    /// Enable or disable MD5 verification.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// The download directory.
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Get download statistics for this session.
    pub fn download_stats(&self) -> DownloadStats {
        DownloadStats {
            files_downloaded: self.files_downloaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
        }
    }

    /// Reset download statistics.
    pub fn reset_download_stats(&self) {
        self.files_downloaded.store(0, Ordering::Relaxed);
        self.bytes_downloaded.store(0, Ordering::Relaxed);
    }

    /// Download all four files of a release.
    ///
    /// Returns the local paths in target order. With verification enabled,
    /// each zip is checked against its `.md5` companion afterwards.
    pub fn fetch(&self, date: &ReleaseDate) -> Result<Vec<PathBuf>> {
        let targets = targets_for_date(date);
        info!("GlimsFetcher[{}]: fetching {} files", date, targets.len());

        let mut paths = Vec::with_capacity(targets.len());
        for name in &targets {
            let out = self.raw_dir.join(name);
            self.download_one(name, &out)?;
            paths.push(out);
        }

        if self.verify {
            for zip in paths.iter().filter(|p| has_extension(p, "zip")) {
                let mut md5 = zip.clone().into_os_string();
                md5.push(".md5");
                verify_archive(zip, Path::new(&md5))?;
                debug!("GlimsFetcher[{}]: checksum ok for {}", date, zip.display());
            }
        }

        let stats = self.download_stats();
        info!(
            "GlimsFetcher[{}]: done ({} files, {} bytes downloaded)",
            date, stats.files_downloaded, stats.bytes_downloaded
        );
        Ok(paths)
    }

    /// Download one file into `out` unless it is already present.
    ///
    /// Returns `true` if a download happened.
    pub fn download_one(&self, name: &str, out: &Path) -> Result<bool> {
        if fs::metadata(out).map(|m| m.len() > 0).unwrap_or(false) {
            debug!("GlimsFetcher[{}]: already present, skipping", name);
            return Ok(false);
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }

        let url = self.base_url.join(name).map_err(|e| FetchError::DownloadFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let mut response = self.get_following_redirects(name, url)?;
        let bytes = write_atomically(&mut response, out)?;

        self.files_downloaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
        metrics::counter!(metric_defs::FETCH_FILES.name).increment(1);
        metrics::counter!(metric_defs::FETCH_BYTES.name).increment(bytes);
        debug!("GlimsFetcher[{}]: {} bytes", name, bytes);

        Ok(true)
    }

    /// GET `url`, following redirects by hand and attaching credentials only
    /// for hosts listed in the netrc.
    fn get_following_redirects(&self, name: &str, mut url: Url) -> Result<Response> {
        for _ in 0..=MAX_REDIRECTS {
            let mut request = self.client.get(url.clone());
            if let Some(creds) = url
                .host_str()
                .and_then(|host| self.netrc.as_ref()?.credentials_for(host))
            {
                request = request.basic_auth(&creds.login, Some(&creds.password));
            }

            let response = request.send()?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| FetchError::DownloadFailed {
                        name: name.to_string(),
                        reason: format!("HTTP {} without Location", status),
                    })?;
                let next = url.join(location).map_err(|e| FetchError::DownloadFailed {
                    name: name.to_string(),
                    reason: format!("bad redirect '{}': {}", location, e),
                })?;
                debug!("GlimsFetcher[{}]: {} -> {}", name, status, next);
                url = next;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::DownloadFailed {
                    name: name.to_string(),
                    reason: format!("HTTP {}", status),
                });
            }
            return Ok(response);
        }
        Err(FetchError::TooManyRedirects(name.to_string()))
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // Url::join drops the last path segment unless it ends with '/'.
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized).map_err(|e| FetchError::DownloadFailed {
        name: base_url.to_string(),
        reason: format!("invalid base URL: {}", e),
    })
}

/// Stream `reader` into `<out>.part`, then rename it to `out`.
///
/// The partial file is removed when the copy fails.
fn write_atomically<R: Read>(reader: &mut R, out: &Path) -> Result<u64> {
    let mut part = out.to_path_buf().into_os_string();
    part.push(".part");
    let part = PathBuf::from(part);

    let written = fs::File::create(&part).and_then(|mut file| {
        let bytes = io::copy(reader, &mut file)?;
        file.flush()?;
        Ok(bytes)
    });
    match written {
        Ok(bytes) => {
            fs::rename(&part, out)?;
            Ok(bytes)
        }
        Err(err) => {
            if let Err(remove_err) = fs::remove_file(&part) {
                debug!("GlimsFetcher: could not remove {}: {}", part.display(), remove_err);
            }
            Err(err.into())
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}
