//! MD5 verification against `.md5` companion files.

use crate::{FetchError, Result};
use md5::{Digest, Md5};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Extract the hex digest from `.md5` file text.
///
/// Accepts both a bare digest and the `md5sum` layout `<digest>  <file>`.
/// The digest is returned lowercase.
pub fn parse_md5(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| token.len() == 32 && token.bytes().all(|b| b.is_ascii_hexdigit()))
        .map(|token| token.to_ascii_lowercase())
}

/// Lowercase hex MD5 digest of a file.
pub fn md5_file(path: impl AsRef<Path>) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Md5::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Check `archive` against the digest stored in `md5_path`.
///
/// On mismatch the archive is deleted so the next fetch downloads it again.
pub fn verify_archive(archive: &Path, md5_path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(md5_path)?;
    let expected =
        parse_md5(&text).ok_or_else(|| FetchError::InvalidChecksumFile(md5_path.to_path_buf()))?;
    let actual = md5_file(archive)?;

    if actual != expected {
        std::fs::remove_file(archive)?;
        return Err(FetchError::ChecksumMismatch {
            name: archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            expected,
            actual,
        });
    }
    Ok(())
}
