//! Concurrent extraction of repository state.
//!
//! A probe's gather call is split into independent subtasks, each of which
//! runs one external command and returns a [`Contribution`]. [`run_subtasks`]
//! starts them all on scoped threads, waits for every one of them, and merges
//! the successful contributions after the join. Subtasks never share the
//! record, so there is nothing to synchronize.

use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::resolver::find_acceptable_path;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::debug;

/// One independent unit of extraction work.
pub type Subtask<'a> = Box<dyn FnOnce() -> Result<Contribution> + Send + 'a>;

/// Boxes a closure as a [`Subtask`].
pub fn subtask<'a, F>(f: F) -> Subtask<'a>
where
    F: FnOnce() -> Result<Contribution> + Send + 'a,
{
    Box::new(f)
}

/// The part of a [`VcsInfo`] produced by a single subtask.
///
/// String fields are `None` when the subtask has nothing to say about them.
/// Flags only ever turn a `false` into a `true` when merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contribution {
    pub repository_root: Option<PathBuf>,
    pub hash: Option<String>,
    pub short_hash: Option<String>,
    pub revision: Option<String>,
    pub branch: Option<String>,
    pub has_staged: bool,
    pub has_modified: bool,
    pub has_new: bool,
    pub has_stashed: bool,
}

impl Contribution {
    /// Folds `other` into `self`.
    ///
    /// Each string field is expected to come from exactly one subtask; if two
    /// subtasks do report the same field, the later one in merge order wins.
    pub fn merge(&mut self, other: Contribution) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.repository_root, other.repository_root);
        take(&mut self.hash, other.hash);
        take(&mut self.short_hash, other.short_hash);
        take(&mut self.revision, other.revision);
        take(&mut self.branch, other.branch);
        self.has_staged |= other.has_staged;
        self.has_modified |= other.has_modified;
        self.has_new |= other.has_new;
        self.has_stashed |= other.has_stashed;
    }

    /// Writes this contribution into `info`.
    ///
    /// Empty strings are treated as "unknown" and leave the field untouched.
    pub fn apply_to(self, info: &mut VcsInfo) {
        fn set(slot: &mut String, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }

        if let Some(root) = self.repository_root.filter(|r| !r.as_os_str().is_empty()) {
            info.repository_root = root;
        }
        set(&mut info.hash, self.hash);
        set(&mut info.short_hash, self.short_hash);
        set(&mut info.revision, self.revision);
        set(&mut info.branch, self.branch);
        info.has_staged |= self.has_staged;
        info.has_modified |= self.has_modified;
        info.has_new |= self.has_new;
        info.has_stashed |= self.has_stashed;
    }
}

/// Runs every subtask concurrently and waits for all of them.
///
/// Returns the merged contributions of the subtasks that succeeded and the
/// errors of those that failed, in no particular order. A panicking subtask
/// is reported as an error instead of tearing down its siblings.
pub fn run_subtasks(subtasks: Vec<Subtask<'_>>) -> (Contribution, Vec<Error>) {
    let results: Vec<Result<Contribution>> = thread::scope(|scope| {
        let handles: Vec<_> = subtasks
            .into_iter()
            .map(|subtask| scope.spawn(subtask))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::other("extraction subtask panicked")))
            })
            .collect()
    });

    let mut merged = Contribution::default();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(contribution) => merged.merge(contribution),
            Err(e) => {
                debug!(error = %e, "extraction subtask failed");
                errors.push(e);
            }
        }
    }

    (merged, errors)
}

/// The shared body of every probe's `gather_info`.
///
/// Locates the repository root above `path` with `is_root`, then builds the
/// probe's subtasks for that root with `subtasks` and runs them. If no root
/// is found, the returned record only carries the name and path, and the
/// error list holds a single [`Error::NoRepositoryRoot`].
pub fn gather<'a, R, S>(
    vcs_name: &str,
    path: &'a Path,
    is_root: R,
    subtasks: S,
) -> (VcsInfo, Vec<Error>)
where
    R: FnMut(&Path) -> Result<bool>,
    S: FnOnce(&Path) -> Vec<Subtask<'a>>,
{
    let mut info = VcsInfo::new(vcs_name, path);

    let root = match find_acceptable_path(path, is_root) {
        Ok(Some(root)) => root,
        Ok(None) => return (info, vec![Error::no_repository_root(vcs_name, path)]),
        Err(e) => return (info, vec![e]),
    };
    debug!(vcs = vcs_name, root = %root.display(), "found repository root");

    let tasks = subtasks(&root);
    info.repository_root = root;

    let (contribution, errors) = run_subtasks(tasks);
    contribution.apply_to(&mut info);

    (info, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::dir_exists;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use tempfile::TempDir;

    #[test]
    fn test_merge_is_monotonic() {
        let mut merged = Contribution {
            has_new: true,
            branch: Some("main".to_string()),
            ..Contribution::default()
        };
        merged.merge(Contribution {
            has_modified: true,
            hash: Some("abc123".to_string()),
            ..Contribution::default()
        });
        merged.merge(Contribution::default());

        assert!(merged.has_new);
        assert!(merged.has_modified);
        assert!(!merged.has_staged);
        assert_eq!(merged.branch.as_deref(), Some("main"));
        assert_eq!(merged.hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_apply_ignores_empty_values() {
        let mut info = VcsInfo::new("git", "/repo");
        info.repository_root = PathBuf::from("/repo");

        Contribution {
            repository_root: Some(PathBuf::new()),
            branch: Some(String::new()),
            revision: Some("7".to_string()),
            has_stashed: true,
            ..Contribution::default()
        }
        .apply_to(&mut info);

        assert_eq!(info.repository_root, PathBuf::from("/repo"));
        assert_eq!(info.branch, "");
        assert_eq!(info.revision, "7");
        assert!(info.has_stashed);
    }

    #[test]
    fn test_partial_failure_keeps_successful_fields() {
        let subtasks: Vec<Subtask<'_>> = vec![
            subtask(|| {
                Ok(Contribution {
                    branch: Some("main".to_string()),
                    ..Contribution::default()
                })
            }),
            subtask(|| Err(Error::other("status exploded"))),
            subtask(|| {
                Ok(Contribution {
                    hash: Some("abc123".to_string()),
                    has_modified: true,
                    ..Contribution::default()
                })
            }),
        ];

        let (merged, errors) = run_subtasks(subtasks);

        assert_eq!(merged.branch.as_deref(), Some("main"));
        assert_eq!(merged.hash.as_deref(), Some("abc123"));
        assert!(merged.has_modified);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "status exploded");
    }

    #[test]
    fn test_all_failures_are_collected() {
        let subtasks: Vec<Subtask<'_>> = vec![
            subtask(|| Err(Error::other("one"))),
            subtask(|| Err(Error::other("two"))),
        ];

        let (merged, errors) = run_subtasks(subtasks);
        assert_eq!(merged, Contribution::default());

        let mut messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        messages.sort();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn test_panicking_subtask_is_reported() {
        let subtasks: Vec<Subtask<'_>> = vec![
            subtask(|| panic!("parser bug")),
            subtask(|| {
                Ok(Contribution {
                    has_new: true,
                    ..Contribution::default()
                })
            }),
        ];

        let (merged, errors) = run_subtasks(subtasks);
        assert!(merged.has_new);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_subtasks_run_concurrently() {
        // Every subtask waits for all the others; this only completes if they
        // are running at the same time.
        let barrier = Barrier::new(3);
        let finished = AtomicUsize::new(0);

        let subtasks: Vec<Subtask<'_>> = (0..3)
            .map(|_| {
                let barrier = &barrier;
                let finished = &finished;
                subtask(move || {
                    barrier.wait();
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(Contribution::default())
                })
            })
            .collect();

        let (_, errors) = run_subtasks(subtasks);
        assert!(errors.is_empty());
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_gather_without_root() {
        let temp = TempDir::new().unwrap();
        let (info, errors) = gather(
            "fake",
            temp.path(),
            |dir| dir_exists(&dir.join(".fake-marker-that-is-not-there")),
            |_| Vec::new(),
        );

        assert_eq!(info.vcs_name, "fake");
        assert_eq!(info.path, temp.path());
        assert_eq!(info.repository_root, PathBuf::new());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::NoRepositoryRoot { .. }));
    }

    #[test]
    fn test_gather_with_root() {
        let temp = TempDir::new().unwrap();
        let deep = temp.path().join("src/deep");
        fs::create_dir_all(&deep).unwrap();
        fs::create_dir(temp.path().join(".fake")).unwrap();

        let (info, errors) = gather(
            "fake",
            &deep,
            |dir| dir_exists(&dir.join(".fake")),
            |root| {
                let name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                vec![
                    subtask(move || {
                        Ok(Contribution {
                            branch: name,
                            ..Contribution::default()
                        })
                    }),
                    subtask(|| Err(Error::other("no hash today"))),
                ]
            },
        );

        assert_eq!(info.path, deep);
        assert_eq!(info.repository_root, temp.path());
        assert_eq!(
            info.branch,
            temp.path().file_name().unwrap().to_string_lossy()
        );
        assert_eq!(errors.len(), 1);
    }
}
