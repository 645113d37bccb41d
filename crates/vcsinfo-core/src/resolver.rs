//! Upward directory walks.
//!
//! [`find_acceptable_path`] is the one primitive behind both repository-root
//! detection and probe selection: evaluate a predicate at a directory, then at
//! each ancestor, nearest first.

use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Walks from `start` towards the filesystem root and returns the first
/// directory for which `is_acceptable` returns `true`.
///
/// The closest directory is always checked first, so the nearest enclosing
/// match wins. Reaching the root without a match yields `Ok(None)`; a
/// predicate error stops the walk and is returned unchanged.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use vcsinfo_core::resolver::{dir_exists, find_acceptable_path};
///
/// let root = find_acceptable_path(Path::new("/work/repo/src"), |dir| {
///     dir_exists(&dir.join(".git"))
/// })?;
/// # Ok::<(), vcsinfo_core::Error>(())
/// ```
pub fn find_acceptable_path<F>(start: &Path, mut is_acceptable: F) -> Result<Option<PathBuf>>
where
    F: FnMut(&Path) -> Result<bool>,
{
    let mut current = Some(start);

    while let Some(dir) = current {
        trace!(dir = %dir.display(), "checking");
        if is_acceptable(dir)? {
            return Ok(Some(dir.to_path_buf()));
        }
        current = dir.parent();
    }

    Ok(None)
}

/// Returns true if `path` exists and is a directory.
///
/// A missing path is `Ok(false)`; any other I/O failure is an error.
pub fn dir_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Returns true if anything exists at `path`.
pub fn file_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nearest_match() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("outer");
        let inner = outer.join("inner");
        let deep = inner.join("a/b");
        fs::create_dir_all(&deep).unwrap();
        fs::write(outer.join("marker"), "").unwrap();
        fs::write(inner.join("marker"), "").unwrap();

        let found = find_acceptable_path(&deep, |dir| file_exists(&dir.join("marker"))).unwrap();
        assert_eq!(found, Some(inner.clone()));

        let found = find_acceptable_path(&inner, |dir| file_exists(&dir.join("marker"))).unwrap();
        assert_eq!(found, Some(inner));
    }

    #[test]
    fn test_not_found_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let found = find_acceptable_path(temp.path(), |_| Ok(false)).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_visits_ancestors_in_order() {
        let mut visited = Vec::new();
        let found = find_acceptable_path(Path::new("/a/b/c"), |dir| {
            visited.push(dir.to_path_buf());
            Ok(false)
        })
        .unwrap();

        assert_eq!(found, None);
        assert_eq!(
            visited,
            vec![
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
                PathBuf::from("/a"),
                PathBuf::from("/"),
            ]
        );
    }

    #[test]
    fn test_predicate_error_aborts_walk() {
        let mut calls = 0;
        let result = find_acceptable_path(Path::new("/a/b/c"), |_| {
            calls += 1;
            Err(Error::other("boom"))
        });

        assert!(matches!(result, Err(Error::Other(ref m)) if m == "boom"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_dir_and_file_exists() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();

        assert!(dir_exists(temp.path()).unwrap());
        assert!(!dir_exists(&file).unwrap());
        assert!(!dir_exists(&temp.path().join("missing")).unwrap());

        assert!(file_exists(&file).unwrap());
        assert!(file_exists(temp.path()).unwrap());
        assert!(!file_exists(&temp.path().join("missing")).unwrap());
    }
}
