//! Archive extraction.

use crate::Result;
use glims_metrics::metric_defs;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extract every `.zip` in `paths` into `extracted_root/<stem>`.
///
/// Paths not ending in `.zip` (such as `.zip.md5` companions) are ignored.
/// A destination that exists and is non-empty is reused as is. An archive
/// that cannot be read is logged and skipped, and its partial destination
/// removed.
///
/// Returns the extraction directories in input order.
pub fn unzip_to<P: AsRef<Path>>(
    paths: &[P],
    extracted_root: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let extracted_root = extracted_root.as_ref();
    fs::create_dir_all(extracted_root)?;

    let mut out_dirs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let is_zip = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase().ends_with(".zip"))
            .unwrap_or(false);
        if !is_zip {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let dest = extracted_root.join(stem);

        if is_non_empty_dir(&dest)? {
            debug!("unzip_to[{}]: already extracted", dest.display());
            out_dirs.push(dest);
            continue;
        }

        fs::create_dir_all(&dest)?;
        match extract(path, &dest) {
            Ok(()) => {
                info!("unzip_to[{}]: extracted {}", dest.display(), path.display());
                metrics::counter!(metric_defs::FETCH_ARCHIVES_EXTRACTED.name).increment(1);
                out_dirs.push(dest);
            }
            Err(err) => {
                warn!("unzip_to[{}]: skipping unreadable archive: {}", path.display(), err);
                fs::remove_dir_all(&dest)?;
            }
        }
    }
    Ok(out_dirs)
}

fn extract(archive: &Path, dest: &Path) -> zip::result::ZipResult<()> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    zip.extract(dest)
}

fn is_non_empty_dir(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(path)?.next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_unzip_extracts_and_ignores_md5() {
        let dir = tempfile::tempdir().unwrap();
        let zip = dir.path().join("glims_north.zip");
        let md5 = dir.path().join("glims_north.zip.md5");
        write_zip(&zip, &[("glims_polygons.geojson", "{}")]);
        fs::write(&md5, "x").unwrap();

        let out = dir.path().join("extracted");
        let dirs = unzip_to(&[zip, md5], &out).unwrap();

        assert_eq!(dirs, vec![out.join("glims_north")]);
        assert!(out.join("glims_north/glims_polygons.geojson").exists());
    }

    #[test]
    fn test_unzip_reuses_non_empty_destination() {
        let dir = tempfile::tempdir().unwrap();
        let zip = dir.path().join("a.zip");
        write_zip(&zip, &[("new.txt", "new")]);

        let out = dir.path().join("extracted");
        fs::create_dir_all(out.join("a")).unwrap();
        fs::write(out.join("a/old.txt"), "old").unwrap();

        let dirs = unzip_to(&[&zip], &out).unwrap();
        assert_eq!(dirs, vec![out.join("a")]);
        assert!(!out.join("a/new.txt").exists());
    }

    #[test]
    fn test_unzip_skips_bad_archive() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.zip");
        let good = dir.path().join("good.ZIP");
        fs::write(&bad, b"not a zip file").unwrap();
        write_zip(&good, &[("x.txt", "x")]);

        let out = dir.path().join("extracted");
        let dirs = unzip_to(&[&bad, &good], &out).unwrap();

        assert_eq!(dirs, vec![out.join("good")]);
        assert!(!out.join("bad").exists());
    }
}
