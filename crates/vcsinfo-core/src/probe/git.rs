//! Git repositories.

use super::VcsProbe;
use crate::command::{command_exists, CommandOutput, CommandRunner};
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::orchestrator::{gather, subtask, Contribution};
use crate::resolver::dir_exists;
use std::path::Path;

/// Probe for Git working trees, detected by a `.git` directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitProbe;

impl VcsProbe for GitProbe {
    fn name(&self) -> &'static str {
        "git"
    }

    fn default_format(&self) -> &'static str {
        "%n[%b%a%m%u%t]"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(command_exists("git"))
    }

    fn is_repository_root(&self, path: &Path) -> Result<bool> {
        dir_exists(&path.join(".git"))
    }

    fn gather_info(&self, path: &Path, runner: &CommandRunner) -> (VcsInfo, Vec<Error>) {
        gather(
            self.name(),
            path,
            |dir| self.is_repository_root(dir),
            |_root| {
                vec![
                    subtask(move || extract_status(runner, path)),
                    subtask(move || extract_branch(runner, path)),
                    subtask(move || extract_hash(runner, path)),
                    subtask(move || extract_short_hash(runner, path)),
                    subtask(move || extract_stashed(runner, path)),
                ]
            },
        )
    }
}

/// Inside the `.git` directory itself there is no work tree to report on.
fn outside_work_tree(out: &CommandOutput) -> bool {
    out.code == Some(128) && out.mentions("must be run in a work tree")
}

fn extract_status(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "git", &["status", "--porcelain"])?;
    if !out.success() {
        if outside_work_tree(&out) {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(parse_status(&out.stdout))
}

fn extract_branch(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "git", &["symbolic-ref", "--short", "HEAD"])?;
    if !out.success() {
        // Detached HEAD
        if out.mentions("is not a symbolic ref") {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(Contribution {
        branch: out.first_line().map(str::to_string),
        ..Contribution::default()
    })
}

fn extract_hash(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    Ok(Contribution {
        hash: rev_parse(runner, path, &["rev-parse", "HEAD"])?,
        ..Contribution::default()
    })
}

fn extract_short_hash(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    Ok(Contribution {
        short_hash: rev_parse(runner, path, &["rev-parse", "--short", "HEAD"])?,
        ..Contribution::default()
    })
}

/// Runs a `rev-parse` and returns its first line, or `None` when the
/// repository has no commits yet (exit code 128).
fn rev_parse(runner: &CommandRunner, path: &Path, args: &[&str]) -> Result<Option<String>> {
    let out = runner.run(path, "git", args)?;
    if !out.success() {
        if out.code == Some(128) {
            return Ok(None);
        }
        return Err(out.failure());
    }

    Ok(out.first_line().map(str::to_string))
}

fn extract_stashed(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "git", &["stash", "list"])?;
    if !out.success() {
        // Older git exits 1 here, newer git 128.
        let old_git = out.code == Some(1) && out.mentions("without a working tree");
        if outside_work_tree(&out) || old_git {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(Contribution {
        has_stashed: out.stdout.iter().any(|line| !line.is_empty()),
        ..Contribution::default()
    })
}

/// Interprets `git status --porcelain` output.
///
/// The first column is the index, the second the work tree; `??` marks an
/// untracked file.
fn parse_status(lines: &[String]) -> Contribution {
    let mut contribution = Contribution::default();

    for line in lines {
        let mut columns = line.chars();
        let index = columns.next().unwrap_or(' ');
        let work = columns.next().unwrap_or(' ');

        if index == '?' || work == '?' {
            contribution.has_new = true;
        } else {
            if index != ' ' {
                contribution.has_staged = true;
            }
            if work != ' ' {
                contribution.has_modified = true;
            }
        }
    }

    contribution
}
