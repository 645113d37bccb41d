//! Format strings.
//!
//! A format string is copied to the output verbatim except for two-character
//! `%` tokens, which are replaced with parts of a [`VcsInfo`]:
//!
//! | token | substitution |
//! |-------|--------------|
//! | `%n`  | VCS name |
//! | `%h`  | hash |
//! | `%s`  | short hash |
//! | `%r`  | revision |
//! | `%v`  | short hash, revision, or hash, whichever is found first |
//! | `%b`  | branch |
//! | `%u`  | untracked files indicator |
//! | `%a`  | staged files indicator |
//! | `%m`  | modified files indicator |
//! | `%t`  | stashed changes indicator |
//! | `%P`  | repository root |
//! | `%p`  | path relative to the repository root |
//! | `%e`  | base name of the repository root |
//! | `%%`  | a literal `%` |

use crate::error::{Error, Result};
use crate::models::{FormatOptions, VcsInfo};
use std::path::Path;

/// Renders `info` through the format string `format`.
///
/// # Errors
///
/// Returns [`Error::UnknownFormatCode`] if `format` contains a `%` token not
/// listed in the [module documentation](self). Nothing is rendered in that
/// case. A lone `%` at the very end of the string is ignored.
///
/// # Example
///
/// ```
/// use vcsinfo_core::{render, FormatOptions, VcsInfo};
///
/// let info = VcsInfo {
///     vcs_name: "git".to_string(),
///     branch: "main".to_string(),
///     hash: "abc123".to_string(),
///     ..VcsInfo::default()
/// };
/// let out = render(&info, "%n|%b|%h", &FormatOptions::default())?;
/// assert_eq!(out, "git|main|abc123");
/// # Ok::<(), vcsinfo_core::Error>(())
/// ```
pub fn render(info: &VcsInfo, format: &str, options: &FormatOptions) -> Result<String> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();

    let or_unknown = |value: &str| -> String {
        if value.is_empty() {
            options.unknown.clone()
        } else {
            value.to_string()
        }
    };
    let flag = |set: bool, indicator: &str| -> String {
        if set {
            indicator.to_string()
        } else {
            String::new()
        }
    };

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let Some(code) = chars.next() else {
            break;
        };

        let piece = match code {
            'n' => info.vcs_name.clone(),
            'h' => or_unknown(&info.hash),
            's' => or_unknown(&info.short_hash),
            'r' => or_unknown(&info.revision),
            'v' => or_unknown(
                [&info.short_hash, &info.revision, &info.hash]
                    .into_iter()
                    .find(|value| !value.is_empty())
                    .map_or("", String::as_str),
            ),
            'b' => or_unknown(&info.branch),
            'u' => flag(info.has_new, &options.has_new),
            'a' => flag(info.has_staged, &options.has_staged),
            'm' => flag(info.has_modified, &options.has_modified),
            't' => flag(info.has_stashed, &options.has_stashed),
            'P' => info.repository_root.display().to_string(),
            'p' => relative_path(&info.repository_root, &info.path),
            'e' => base_name(&info.repository_root),
            '%' => "%".to_string(),
            other => return Err(Error::UnknownFormatCode(other)),
        };
        out.push_str(&piece);
    }

    Ok(out)
}

/// `path` relative to `root`: `.` when they are the same directory, nothing
/// when `root` is unknown or is not an ancestor of `path`.
fn relative_path(root: &Path, path: &Path) -> String {
    if root.as_os_str().is_empty() {
        return String::new();
    }

    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => String::new(),
    }
}

/// Last component of `root`; the root itself if it has none (e.g. `/`).
fn base_name(root: &Path) -> String {
    match root.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => root.display().to_string(),
    }
}
