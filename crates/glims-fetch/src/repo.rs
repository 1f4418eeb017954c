//! Repository root discovery for resolving relative data directories.

use std::path::{Path, PathBuf};

/// Nearest ancestor of `start` (inclusive) that contains a `.git` entry.
pub fn find_repo_root(start: impl AsRef<Path>) -> Option<PathBuf> {
    let start = start.as_ref();
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_dir(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.as_ref().join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_repo_root_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        let nested = root.join("notebooks/deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root(&nested), Some(root.clone()));
        assert_eq!(find_repo_root(&root), Some(root));
    }

    #[test]
    fn test_find_repo_root_none() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir_all(&nested).unwrap();
        // A .git somewhere above the temp dir would be found; only assert the
        // temp dir itself is not reported.
        assert_ne!(find_repo_root(&nested), Some(nested.canonicalize().unwrap()));
    }

    #[test]
    fn test_resolve_dir() {
        let base = Path::new("/repo");
        assert_eq!(resolve_dir("data/raw", base), PathBuf::from("/repo/data/raw"));
        assert_eq!(resolve_dir("/abs/raw", base), PathBuf::from("/abs/raw"));
    }
}
