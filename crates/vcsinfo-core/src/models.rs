//! Core data models shared by probes and renderers.
//!
//! [`VcsInfo`] is the snapshot every probe produces; its serde attributes
//! define the JSON field names, which are part of the external contract.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The state of one repository as seen from one path.
///
/// Built empty at the start of a gather call, filled from the contributions
/// of the probe's subtasks, and never mutated after it is returned. String
/// fields use the empty string for "unknown"; not every VCS populates every
/// field (CVS has no hash, for instance).
///
/// # Example
///
/// ```
/// # use vcsinfo_core::VcsInfo;
/// let info = VcsInfo {
///     vcs_name: "git".to_string(),
///     branch: "main".to_string(),
///     ..VcsInfo::default()
/// };
/// assert!(!info.has_modified);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VcsInfo {
    /// Name of the probe that produced this record (e.g. `"git"`).
    pub vcs_name: String,

    /// The path that was examined, as requested.
    pub path: PathBuf,

    /// The root directory of the repository. Empty if detection failed.
    pub repository_root: PathBuf,

    /// Abbreviated changeset hash, if the VCS has such a concept.
    pub short_hash: String,

    /// Full hash of the current changeset.
    pub hash: String,

    /// Revision number or ID of the current changeset.
    pub revision: String,

    /// The current branch.
    pub branch: String,

    /// Whether there are changes staged for commit.
    pub has_staged: bool,

    /// Whether there are added, modified, or deleted files.
    pub has_modified: bool,

    /// Whether there are untracked files.
    pub has_new: bool,

    /// Whether there are stashed or shelved changes.
    ///
    /// Only available to format strings (`%t`); the JSON and XML documents
    /// keep their original field set.
    #[serde(skip)]
    pub has_stashed: bool,
}

impl VcsInfo {
    /// Creates an empty record for the given probe name and path.
    pub fn new(vcs_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            vcs_name: vcs_name.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}

/// The literal strings substituted for the indicator and unknown tokens of a
/// format string.
///
/// Constructed once from [`FormatOptions::default`] plus caller overrides and
/// then passed by reference into [`render`](crate::render).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Emitted by `%a` when there are staged changes.
    pub has_staged: String,

    /// Emitted by `%m` when there are modified files.
    pub has_modified: String,

    /// Emitted by `%u` when there are untracked files.
    pub has_new: String,

    /// Emitted by `%t` when there are stashed changes.
    pub has_stashed: String,

    /// Emitted by `%h`, `%s`, `%r`, `%v` and `%b` when the value is unknown.
    pub unknown: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            has_staged: "*".to_string(),
            has_modified: "+".to_string(),
            has_new: "?".to_string(),
            has_stashed: "@".to_string(),
            unknown: String::new(),
        }
    }
}
