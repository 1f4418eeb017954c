//! Data directory resolution.

use glims_fetch::{find_repo_root, resolve_dir};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base directory for relative data paths: the repository root containing
/// `cwd` if there is one, otherwise `cwd` itself.
pub fn data_base(cwd: &Path) -> PathBuf {
    match find_repo_root(cwd) {
        Some(root) => {
            debug!("paths: repository root {}", root.display());
            root
        }
        None => cwd.to_path_buf(),
    }
}

/// Resolve a data directory against [`data_base`].
pub fn resolve_data_dir(path: &Path, cwd: &Path) -> PathBuf {
    resolve_dir(path, data_base(cwd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_against_repo_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("notebooks")).unwrap();

        let resolved = resolve_data_dir(Path::new("data/raw"), &root.join("notebooks"));
        assert_eq!(resolved, root.join("data/raw"));
    }

    #[test]
    fn test_absolute_path_kept() {
        let dir = tempfile::tempdir().unwrap();
        let abs = dir.path().join("elsewhere");
        assert_eq!(resolve_data_dir(&abs, dir.path()), abs);
    }
}
