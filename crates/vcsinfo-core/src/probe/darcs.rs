//! Darcs repositories.

use super::VcsProbe;
use crate::command::{command_exists, CommandRunner};
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::orchestrator::{gather, subtask, Contribution};
use crate::resolver::dir_exists;
use std::path::Path;

/// Probe for Darcs repositories, detected by a `_darcs` directory.
///
/// Darcs has no named branches; the repository directory name stands in for
/// one, as is customary.
#[derive(Debug, Clone, Copy, Default)]
pub struct DarcsProbe;

impl VcsProbe for DarcsProbe {
    fn name(&self) -> &'static str {
        "darcs"
    }

    fn default_format(&self) -> &'static str {
        "%n[%b%m%u]"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(command_exists("darcs"))
    }

    fn is_repository_root(&self, path: &Path) -> Result<bool> {
        dir_exists(&path.join("_darcs"))
    }

    fn gather_info(&self, path: &Path, runner: &CommandRunner) -> (VcsInfo, Vec<Error>) {
        gather(
            self.name(),
            path,
            |dir| self.is_repository_root(dir),
            |root| {
                let branch = root
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                vec![
                    subtask(move || {
                        Ok(Contribution {
                            branch,
                            ..Contribution::default()
                        })
                    }),
                    subtask(move || extract_status(runner, path)),
                    subtask(move || extract_hash(runner, path)),
                ]
            },
        )
    }
}

fn extract_status(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(
        path,
        "darcs",
        &["whatsnew", "--look-for-adds", "--summary"],
    )?;
    if !out.success() {
        // whatsnew exits 1 on a clean tree
        if out.lines().next() == Some("No changes!") {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(parse_whatsnew(&out.stdout))
}

/// Interprets `darcs whatsnew --summary`; a lowercase `a` marks a file that
/// `--look-for-adds` found but that is not yet recorded.
fn parse_whatsnew(lines: &[String]) -> Contribution {
    let mut contribution = Contribution::default();

    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        if line.starts_with('a') {
            contribution.has_new = true;
        } else if line != "No changes!" {
            contribution.has_modified = true;
        }
    }

    contribution
}

fn extract_hash(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "darcs", &["log", "--last", "1"])?.check()?;

    let hash = out
        .stdout
        .iter()
        .filter_map(|line| line.strip_prefix("patch "))
        .last()
        .map(str::to_string);

    Ok(Contribution {
        hash,
        ..Contribution::default()
    })
}
