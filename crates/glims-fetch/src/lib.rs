//! # glims-fetch
//!
//! Downloads and unpacks the GLIMS glacier database releases published by
//! NSIDC as dataset NSIDC-0272.
//!
//! A release is identified by its [`ReleaseDate`] and consists of a north
//! and a south archive, each with an MD5 companion. Access requires an
//! Earthdata account, read from a netrc file.
//!
//! ## Example
//!
//! ```no_run
//! use glims_fetch::{unzip_to, GlimsFetcher, Netrc, ReleaseDate};
//!
//! let date = ReleaseDate::parse("20260114")?;
//! let fetcher = GlimsFetcher::new("data/raw/glims_v1")?
//!     .with_netrc(Netrc::from_file("_netrc")?);
//!
//! let files = fetcher.fetch(&date)?;
//! let dirs = unzip_to(&files, "data/raw/glims_v1/extracted")?;
//! println!("extracted {} archives", dirs.len());
//! # Ok::<(), glims_fetch::FetchError>(())
//! ```

mod archive;
mod checksum;
mod error;
mod fetcher;
mod netrc;
mod release;
mod repo;

pub use archive::unzip_to;
pub use checksum::{md5_file, parse_md5, verify_archive};
pub use error::FetchError;
pub use fetcher::{DownloadStats, GlimsFetcher, DEFAULT_TIMEOUT, MAX_REDIRECTS};
pub use netrc::{Credentials, Netrc};
pub use release::{targets_for_date, Hemisphere, ReleaseDate, BASE_URL, VERSION_TAG};
pub use repo::{find_repo_root, resolve_dir};

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
