//! Fossil checkouts.

use super::VcsProbe;
use crate::command::{command_exists, CommandRunner};
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use crate::orchestrator::{gather, subtask, Contribution};
use crate::resolver::file_exists;
use std::path::{Path, PathBuf};

/// Checkout database names; `_FOSSIL_` is the legacy and Windows spelling.
const CHECKOUT_MARKERS: &[&str] = &[".fslckout", "_FOSSIL_"];

/// Probe for Fossil checkouts, detected by the checkout database file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FossilProbe;

impl VcsProbe for FossilProbe {
    fn name(&self) -> &'static str {
        "fossil"
    }

    fn default_format(&self) -> &'static str {
        "%n[%b%m%u]"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(command_exists("fossil"))
    }

    fn is_repository_root(&self, path: &Path) -> Result<bool> {
        for marker in CHECKOUT_MARKERS {
            if file_exists(&path.join(marker))? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn gather_info(&self, path: &Path, runner: &CommandRunner) -> (VcsInfo, Vec<Error>) {
        gather(
            self.name(),
            path,
            |dir| self.is_repository_root(dir),
            |_root| {
                vec![
                    subtask(move || extract_info(runner, path)),
                    subtask(move || extract_changes(runner, path)),
                    subtask(move || extract_extras(runner, path)),
                ]
            },
        )
    }
}

fn extract_info(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "fossil", &["info"])?.check()?;
    Ok(parse_info(&out.stdout))
}

/// Interprets the `field: value` lines of `fossil info`.
///
/// `local-root` is Fossil's own idea of the checkout root and takes
/// precedence over the marker-file walk.
fn parse_info(lines: &[String]) -> Contribution {
    let mut contribution = Contribution::default();

    for line in lines {
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match field {
            "local-root" => {
                let root = value.trim_end_matches('/');
                let root = if root.is_empty() { value } else { root };
                contribution.repository_root = Some(PathBuf::from(root));
            }
            "checkout" => {
                contribution.hash = value.split(' ').next().map(str::to_string);
            }
            "tags" => {
                contribution.branch = value.split(", ").next().map(str::to_string);
            }
            _ => {}
        }
    }

    contribution
}

fn extract_changes(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "fossil", &["changes"])?.check()?;
    Ok(Contribution {
        has_modified: out.stdout.iter().any(|line| !line.is_empty()),
        ..Contribution::default()
    })
}

fn extract_extras(runner: &CommandRunner, path: &Path) -> Result<Contribution> {
    let out = runner.run(path, "fossil", &["extras"])?.check()?;
    Ok(Contribution {
        has_new: out.stdout.iter().any(|line| !line.is_empty()),
        ..Contribution::default()
    })
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
        assert!(!FossilProbe.is_repository_root(temp.path()).unwrap());

        fs::write(temp.path().join(".fslckout"), "").unwrap();
        assert!(FossilProbe.is_repository_root(temp.path()).unwrap());

        let legacy = TempDir::new().unwrap();
        fs::write(legacy.path().join("_FOSSIL_"), "").unwrap();
        assert!(FossilProbe.is_repository_root(legacy.path()).unwrap());
    }

    #[test]
    fn test_parse_info() {
        let c = parse_info(&lines(&[
            "project-name: demo",
            "repository:   /home/me/demo.fossil",
            "local-root:   /home/me/demo/",
            "config-db:    /home/me/.fossil",
            "checkout:     0c8e6a4b19d4f5e6 2024-03-01 10:11:12 UTC",
            "parent:       99aa12bc 2024-02-28 09:00:00 UTC",
            "tags:         trunk, release",
            "comment:      tweak: something (user: me)",
        ]));

        assert_eq!(c.repository_root, Some(PathBuf::from("/home/me/demo")));
        assert_eq!(c.hash.as_deref(), Some("0c8e6a4b19d4f5e6"));
        assert_eq!(c.branch.as_deref(), Some("trunk"));
    }

    #[test]
    fn test_parse_info_ignores_unrelated_lines() {
        let c = parse_info(&lines(&["no colon here", "comment: tags: fake"]));
        assert_eq!(c, Contribution::default());
    }
}
