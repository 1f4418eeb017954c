//! Error types for the fetch crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when downloading or unpacking GLIMS archives.
#[derive(Debug, Error)]
pub enum FetchError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Release date is not an 8-digit calendar date.
    #[error("Invalid release date '{0}' (expected YYYYMMDD)")]
    InvalidDate(String),

    /// The server did not deliver a file.
    #[error("Failed to download {name}: {reason}")]
    DownloadFailed {
        /// File name being downloaded.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// Redirect chain exceeded the hop limit.
    #[error("Too many redirects fetching {0}")]
    TooManyRedirects(String),

    /// Downloaded archive does not match its published checksum.
    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Archive file name.
        name: String,
        /// Digest from the .md5 companion.
        expected: String,
        /// Digest of the downloaded bytes.
        actual: String,
    },

    /// A .md5 companion file holds no digest.
    #[error("No MD5 digest found in {0}")]
    InvalidChecksumFile(PathBuf),

    /// Malformed netrc file.
    #[error("Invalid netrc: {0}")]
    Netrc(String),
}
