//! CVS working directories.

use super::VcsProbe;
use crate::command::{command_exists, CommandOutput, CommandRunner};
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::orchestrator::{gather, subtask, Contribution};
use crate::resolver::dir_exists;
use std::path::Path;

/// `cvs status` states that count as local modifications.
const MODIFIED_STATES: &[&str] = &[
    "Locally Added",
    "Locally Modified",
    "Locally Removed",
    "Needs Checkout",
];

/// Probe for CVS working directories.
///
/// Every directory of a CVS checkout has its own `CVS` admin directory, so
/// the root is the topmost one: a directory with `CVS` whose parent has none.
#[derive(Debug, Clone, Copy, Default)]
pub struct CvsProbe;

impl VcsProbe for CvsProbe {
    fn name(&self) -> &'static str {
        "cvs"
    }

    fn default_format(&self) -> &'static str {
        "%n[%e%m%u]"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(command_exists("cvs"))
    }

    fn is_repository_root(&self, path: &Path) -> Result<bool> {
        if !dir_exists(&path.join("CVS"))? {
            return Ok(false);
        }

        match path.parent() {
            Some(parent) => Ok(!dir_exists(&parent.join("CVS"))?),
            None => Ok(true),
        }
    }

    fn gather_info(&self, path: &Path, runner: &CommandRunner) -> (VcsInfo, Vec<Error>) {
        gather(
            self.name(),
            path,
            |dir| self.is_repository_root(dir),
            |_root| {
                vec![
                    subtask(move || extract_status(runner, path)),
                    subtask(move || extract_new(runner, path)),
                ]
            },
        )
    }
}

/// A directory not yet added to the repository has no CVSROOT to talk to.
fn missing_cvsroot(out: &CommandOutput) -> bool {
    out.mentions("No CVSROOT specified!")
}

fn extract_status(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "cvs", &["status"])?;
    if !out.success() {
        if missing_cvsroot(&out) {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(Contribution {
        has_modified: out
            .stdout
            .iter()
            .any(|line| MODIFIED_STATES.iter().any(|state| line.ends_with(state))),
        ..Contribution::default()
    })
}

fn extract_new(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "cvs", &["-qn", "update"])?;
    if !out.success() {
        if missing_cvsroot(&out) {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(Contribution {
        has_new: out.stdout.iter().any(|line| line.starts_with('?')),
        ..Contribution::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_identity() {
        assert_eq!(CvsProbe.name(), "cvs");
        assert_eq!(CvsProbe.default_format(), "%n[%e%m%u]");
    }

    #[test]
    fn test_is_repository_root_is_topmost_cvs_dir() {
        let temp = TempDir::new().unwrap();
        let top = temp.path().join("module");
        let nested = top.join("src");
        fs::create_dir_all(nested.join("CVS")).unwrap();

        // Only the nested directory has admin files so far.
        assert!(CvsProbe.is_repository_root(&nested).unwrap());

        fs::create_dir(top.join("CVS")).unwrap();
        assert!(CvsProbe.is_repository_root(&top).unwrap());
        assert!(!CvsProbe.is_repository_root(&nested).unwrap());
        assert!(!CvsProbe.is_repository_root(temp.path()).unwrap());
    }

    #[test]
    fn test_missing_cvsroot() {
        let out = CommandOutput {
            command: "cvs status".to_string(),
            code: Some(1),
            stdout: vec![],
            stderr: vec!["cvs status: No CVSROOT specified!  Please use the `-d' option".to_string()],
        };
        assert!(missing_cvsroot(&out));
    }
}
