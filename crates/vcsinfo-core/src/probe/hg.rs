//! Mercurial repositories.

use super::VcsProbe;
use crate::command::{command_exists, CommandRunner};
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::orchestrator::{gather, subtask, Contribution};
use crate::resolver::dir_exists;
use std::path::Path;

/// `hg identify` reports this id for a repository without commits.
const NULL_ID: &str = "0000000000000000000000000000000000000000";

/// Length of a full changeset id printed by `hg identify --debug`.
const HASH_LEN: usize = 40;

/// Length of Mercurial's conventional short changeset id.
const SHORT_HASH_LEN: usize = 12;

/// Probe for Mercurial repositories, detected by a `.hg` directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HgProbe;

impl VcsProbe for HgProbe {
    fn name(&self) -> &'static str {
        "hg"
    }

    fn default_format(&self) -> &'static str {
        "%n[%b%m%u%t]"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(command_exists("hg"))
    }

    fn is_repository_root(&self, path: &Path) -> Result<bool> {
        dir_exists(&path.join(".hg"))
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
    let out = runner
        .run(
            path,
            "hg",
            &[
                "status",
                "--modified",
                "--added",
                "--removed",
                "--unknown",
                "--deleted",
            ],
        )?
        .check()?;

    let mut contribution = Contribution::default();
    for line in out.stdout.iter().filter(|l| !l.is_empty()) {
        if line.starts_with('?') {
            contribution.has_new = true;
        } else {
            contribution.has_modified = true;
        }
    }

    Ok(contribution)
}

fn extract_commit_info(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner
        .run(path, "hg", &["identify", "--branch", "--num", "--id", "--debug"])?
        .check()?;

    let line = out
        .first_line()
        .ok_or_else(|| Error::unexpected_output("hg", "identify printed nothing"))?;

    parse_identify(line)
}

/// Interprets `hg identify --branch --num --id --debug`, which prints
/// `<hash>[+] <rev>[+] <branch>`. A trailing `+` marks uncommitted changes.
/// The branch is everything after the second space, so it may contain spaces.
fn parse_identify(line: &str) -> Result<Contribution> {
    let unparseable = || {
        Error::unexpected_output("hg", format!("cannot parse identify output {:?}", line))
    };

    let mut parts = line.splitn(3, ' ');
    let (Some(id), Some(rev), Some(branch)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(unparseable());
    };

    let hash = id.trim_end_matches('+');
    let is_hash = hash.len() == HASH_LEN && hash.bytes().all(|b| b.is_ascii_hexdigit());
    if !is_hash || branch.is_empty() {
        return Err(unparseable());
    }

    let mut contribution = Contribution {
        branch: Some(branch.to_string()),
        ..Contribution::default()
    };

    if hash == NULL_ID {
        return Ok(contribution);
    }

    contribution.short_hash = Some(hash[..SHORT_HASH_LEN].to_string());
    contribution.hash = Some(hash.to_string());
    contribution.revision = Some(rev.trim_end_matches('+').to_string());

    Ok(contribution)
}

fn extract_shelved(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "hg", &["shelve", "--list"])?;
    if !out.success() {
        // The shelve extension is not enabled.
        if out.code == Some(255) {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(Contribution {
        has_stashed: out.stdout.iter().any(|line| !line.is_empty()),
        ..Contribution::default()
    })
}
