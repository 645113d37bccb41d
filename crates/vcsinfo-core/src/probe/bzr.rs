//! Bazaar branches.

use super::VcsProbe;
use crate::command::{command_exists, CommandRunner};
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::orchestrator::{gather, subtask, Contribution};
use crate::resolver::dir_exists;
use std::path::Path;

/// Status section headers that count as local modifications.
const MODIFIED_SECTIONS: &[&str] = &["added", "removed", "renamed", "kind changed", "modified"];

/// Probe for Bazaar branches, detected by a `.bzr/branch` directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct BzrProbe;

impl VcsProbe for BzrProbe {
    fn name(&self) -> &'static str {
        "bzr"
    }

    fn default_format(&self) -> &'static str {
        "%n[%b%m%u%t]"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(command_exists("bzr"))
    }

    fn is_repository_root(&self, path: &Path) -> Result<bool> {
        dir_exists(&path.join(".bzr").join("branch"))
    }

    fn gather_info(&self, path: &Path, runner: &CommandRunner) -> (VcsInfo, Vec<Error>) {
        gather(
            self.name(),
            path,
            |dir| self.is_repository_root(dir),
            |_root| {
                vec![
                    subtask(move || extract_status(runner, path)),
                    subtask(move || extract_commit_info(runner, path)),
                    subtask(move || extract_shelved(runner, path)),
                ]
            },
        )
    }
}

fn extract_status(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "bzr", &["status"])?.check()?;
    Ok(parse_status(&out.stdout))
}

/// Interprets `bzr status`, which groups files under section headers such as
/// `modified:` and `unknown:`.
fn parse_status(lines: &[String]) -> Contribution {
    let mut contribution = Contribution::default();

    for line in lines {
        if MODIFIED_SECTIONS
            .iter()
            .any(|section| line.starts_with(section))
        {
            contribution.has_modified = true;
        } else if line.starts_with("unknown") {
            contribution.has_new = true;
        }
    }

    contribution
}

fn extract_commit_info(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "bzr", &["version-info"])?.check()?;
    Ok(parse_version_info(&out.stdout))
}

/// Interprets the `key: value` lines of `bzr version-info`.
fn parse_version_info(lines: &[String]) -> Contribution {
    let mut contribution = Contribution::default();

    for line in lines {
        let Some((key, value)) = line.split_once(": ") else {
            continue;
        };

        match key {
            "revision-id" => contribution.hash = Some(value.to_string()),
            // revno 0 means the branch has no commits
            "revno" if value != "0" => contribution.revision = Some(value.to_string()),
            "branch-nick" => contribution.branch = Some(value.to_string()),
            _ => {}
        }
    }

    contribution
}

fn extract_shelved(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    // `bzr shelve --list` exits non-zero exactly when there are shelved changes.
    let out = runner.run(path, "bzr", &["shelve", "--list"])?;
    Ok(Contribution {
        has_stashed: out.code.map_or(false, |code| code > 0),
        ..Contribution::default()
    })
}
