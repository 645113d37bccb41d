//! Subversion working copies.

use super::VcsProbe;
use crate::command::{command_exists, CommandRunner};
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::orchestrator::{gather, subtask, Contribution};
use crate::resolver::dir_exists;
use std::path::Path;

/// Probe for Subversion working copies, detected by a `.svn` directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvnProbe;

impl VcsProbe for SvnProbe {
    fn name(&self) -> &'static str {
        "svn"
    }

    fn default_format(&self) -> &'static str {
        "%n[%b%m%u]"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(command_exists("svn"))
    }

    fn is_repository_root(&self, path: &Path) -> Result<bool> {
        dir_exists(&path.join(".svn"))
    }

    fn gather_info(&self, path: &Path, runner: &CommandRunner) -> (VcsInfo, Vec<Error>) {
        gather(
            self.name(),
            path,
            |dir| self.is_repository_root(dir),
            |_root| {
                vec![
                    subtask(move || extract_status(runner, path)),
                    subtask(move || extract_info(runner, path)),
                ]
            },
        )
    }
}

fn extract_status(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "svn", &["status"])?.check()?;
    Ok(parse_status(&out.stdout))
}

/// Interprets `svn status`: column one is the item state, column two the
/// property state.
fn parse_status(lines: &[String]) -> Contribution {
    let mut contribution = Contribution::default();

    for line in lines {
        let mut columns = line.chars();
        let item = columns.next().unwrap_or(' ');
        let props = columns.next().unwrap_or(' ');

        if item == '?' {
            contribution.has_new = true;
        } else if item != ' ' || props != ' ' {
            contribution.has_modified = true;
        }
    }

    contribution
}

fn extract_info(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "svn", &["info"])?;
    if !out.success() {
        // E200009: the directory is not under version control yet.
        if out.mentions("svn: E200009") {
            return Ok(Contribution::default());
        }
        return Err(out.failure());
    }

    Ok(parse_info(&out.stdout))
}

fn parse_info(lines: &[String]) -> Contribution {
    let mut contribution = Contribution::default();

    for line in lines {
        if let Some(relative) = line.strip_prefix("Relative URL: ^") {
            if relative == "/trunk" || relative.starts_with("/trunk/") {
                contribution.branch = Some("trunk".to_string());
            } else if let Some(rest) = relative.strip_prefix("/branches/") {
                let name = rest.split('/').next().unwrap_or(rest);
                if !name.is_empty() {
                    contribution.branch = Some(name.to_string());
                }
            }
        } else if let Some(rev) = line.strip_prefix("Last Changed Rev: ") {
            contribution.revision = Some(rev.trim().to_string());
        }
    }

    contribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_repository_root() {
        let temp = TempDir::new().unwrap();
        assert!(!SvnProbe.is_repository_root(temp.path()).unwrap());

        fs::create_dir(temp.path().join(".svn")).unwrap();
        assert!(SvnProbe.is_repository_root(temp.path()).unwrap());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(&[]), Contribution::default());

        let c = parse_status(&lines(&["?       scratch.txt"]));
        assert!(c.has_new && !c.has_modified);

        let c = parse_status(&lines(&["M       main.c", " M      ."]));
        assert!(c.has_modified && !c.has_new);
    }

    #[test]
    fn test_parse_info_trunk() {
        let c = parse_info(&lines(&[
            "Path: .",
            "URL: file:///tmp/repo/trunk",
            "Relative URL: ^/trunk",
            "Revision: 3",
            "Last Changed Rev: 2",
        ]));
        assert_eq!(c.branch.as_deref(), Some("trunk"));
        assert_eq!(c.revision.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_info_branch() {
        let c = parse_info(&lines(&["Relative URL: ^/branches/mybranch"]));
        assert_eq!(c.branch.as_deref(), Some("mybranch"));

        let c = parse_info(&lines(&["Relative URL: ^/branches/mybranch/src"]));
        assert_eq!(c.branch.as_deref(), Some("mybranch"));
    }

    #[test]
    fn test_parse_info_other_layout() {
        let c = parse_info(&lines(&["Relative URL: ^/tags/v1.0"]));
        assert!(c.branch.is_none());
        assert!(c.revision.is_none());
    }
}
