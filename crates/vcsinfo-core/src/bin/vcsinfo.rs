//! Command-line interface for vcsinfo.
//!
//! Prints a one-line summary of the repository enclosing a directory, meant
//! to be embedded in a shell prompt. Outside any repository it prints
//! nothing.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vcsinfo_core::{
    available_probes, find_probe_for_path, render, to_json, to_xml, CommandRunner, FormatOptions,
    VcsInfo, VcsProbe,
};

const FORMAT_CODES_HELP: &str = "\
Format String Codes:
  %n  VCS name
  %h  Hash
  %s  Short Hash
  %r  Revision ID
  %v  Short Hash, Revision ID, or Hash (whichever one that is found first is used)
  %b  Branch
  %u  Untracked files indicator
  %a  Staged files indicator
  %m  Modified files indicator
  %t  Stashed changes indicator
  %P  Repository root directory
  %p  Relative path to Repository root directory (relative to the analyzed path)
  %e  Base name of the repository root directory
  %%  Literal \"%\"";

/// vcsinfo - Summarize the VCS repository around a directory
#[derive(Parser, Debug)]
#[command(
    name = "vcsinfo",
    version,
    about = "Retrieves and outputs basic information about the status of a VCS repository",
    long_about = None
)]
struct Cli {
    /// The path to retrieve VCS information for
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    path: Option<PathBuf>,

    /// The output format of the VCS information
    #[arg(short = 'f', long = "format", value_name = "FORMAT", env = "VCSINFO_FORMAT")]
    format: Option<String>,

    /// The string to use for the untracked files indicator
    #[arg(long = "format-untracked", value_name = "TEXT", env = "VCSINFO_UNTRACKED", default_value = "?")]
    untracked: String,

    /// The string to use for the modified files indicator
    #[arg(long = "format-modified", value_name = "TEXT", env = "VCSINFO_MODIFIED", default_value = "+")]
    modified: String,

    /// The string to use for the staged files indicator
    #[arg(long = "format-staged", value_name = "TEXT", env = "VCSINFO_STAGED", default_value = "*")]
    staged: String,

    /// The string to use for the stashed changes indicator
    #[arg(long = "format-stashed", value_name = "TEXT", env = "VCSINFO_STASHED", default_value = "@")]
    stashed: String,

    /// The string to use for format codes where no value could be determined
    #[arg(long = "format-unknown", value_name = "TEXT", env = "VCSINFO_UNKNOWN")]
    unknown: Option<String>,

    /// Give up on a VCS command after this many milliseconds
    #[arg(long = "timeout", value_name = "MS", env = "VCSINFO_TIMEOUT")]
    timeout: Option<u64>,

    /// Renders the output in a JSON object (overrides --format)
    #[arg(long = "json", conflicts_with = "xml")]
    json: bool,

    /// Renders the output in an XML document (overrides --format)
    #[arg(long = "xml")]
    xml: bool,

    /// If hard failures are encountered, complain loudly instead of silently outputting nothing
    #[arg(long = "noisy")]
    noisy: bool,

    /// Show debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn format_options(&self) -> FormatOptions {
        FormatOptions {
            has_new: self.untracked.clone(),
            has_modified: self.modified.clone(),
            has_staged: self.staged.clone(),
            has_stashed: self.stashed.clone(),
            unknown: self.unknown.clone().unwrap_or_default(),
        }
    }

    fn runner(&self) -> CommandRunner {
        CommandRunner::new().with_timeout(self.timeout.map(Duration::from_millis))
    }
}

fn main() -> ExitCode {
    let probes = available_probes();

    let help = build_help(probes.as_ref().map_or(&[][..], Vec::as_slice));
    let matches = Cli::command().after_help(help).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    init_logging(cli.verbose);

    let result = run(&cli, probes);
    ExitCode::from(exit_status(&cli, result))
}

/// Maps the outcome of [`run`] to an exit status. Without `--noisy` a hard
/// failure is only visible in debug logs and the status stays 0.
fn exit_status(cli: &Cli, result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) if cli.noisy => {
            eprintln!("vcsinfo: error: {err:#}");
            1
        }
        Err(err) => {
            debug!("{err:#}");
            0
        }
    }
}

/// Log level used when `VCSINFO_LOG` is unset: silent unless `--verbose`.
fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "off"
    }
}

/// Installs the stderr subscriber; `VCSINFO_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("VCSINFO_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, probes: vcsinfo_core::Result<Vec<&'static dyn VcsProbe>>) -> Result<()> {
    let probes = probes.context("Could not determine available VCS probes")?;
    let path = determine_path(cli.path.as_deref()).context("Could not find path to analyze")?;

    let Some(probe) = find_probe_for_path(&path, &probes).context("Failure detecting VCS")? else {
        debug!(path = %path.display(), "no repository found");
        return Ok(());
    };

    let (info, errors) = probe.gather_info(&path, &cli.runner());
    if cli.noisy && !errors.is_empty() {
        for err in &errors {
            eprintln!("vcsinfo: error: {err}");
        }
        bail!("Failure retrieving VCS information");
    }

    let output = produce_output(cli, &info, probe).context("Failure producing output")?;
    println!("{}", output);

    Ok(())
}

fn produce_output(cli: &Cli, info: &VcsInfo, probe: &dyn VcsProbe) -> vcsinfo_core::Result<String> {
    if cli.json {
        return to_json(info);
    }
    if cli.xml {
        return to_xml(info);
    }

    let format = cli.format.as_deref().unwrap_or(probe.default_format());
    render(info, format, &cli.format_options())
}

/// Resolves the path to analyze: the given one with `~` expanded, or the
/// current directory. The result is canonical and must be a directory.
fn determine_path(given: Option<&Path>) -> Result<PathBuf> {
    let path = match given {
        Some(path) => expand_home(path),
        None => std::env::current_dir().context("Could not determine current directory")?,
    };

    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !path.is_dir() {
        bail!("Path is not a directory: {}", path.display());
    }

    Ok(path)
}

/// Replaces a leading `~` with the home directory, when one is known.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Lists each distinct default format along with the probes that use it.
fn default_formats_help(probes: &[&dyn VcsProbe]) -> String {
    let mut by_format: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for probe in probes {
        by_format
            .entry(probe.default_format())
            .or_default()
            .push(probe.name());
    }

    let mut out = String::new();
    for (format, mut names) in by_format {
        names.sort_unstable();
        out.push_str(&format!("  {}:\n    {}\n\n", names.join(", "), format));
    }

    out.trim_end().to_string()
}

fn build_help(probes: &[&dyn VcsProbe]) -> String {
    format!(
        "{FORMAT_CODES_HELP}

If no format string is specified on the command line or via environment
variables, then the following strings will be used, depending on which VCS is
detected:

{}

Environment Variables:
  VCSINFO_FORMAT     The format string to use when --format is not given
  VCSINFO_UNTRACKED  The string to use for the untracked files indicator
  VCSINFO_MODIFIED   The string to use for the modified files indicator
  VCSINFO_STAGED     The string to use for the staged files indicator
  VCSINFO_STASHED    The string to use for the stashed changes indicator
  VCSINFO_UNKNOWN    The string to use for %h/%s/%r/%v/%b when no value is known
  VCSINFO_TIMEOUT    Milliseconds before a VCS command is abandoned
  VCSINFO_LOG        Log filter for stderr diagnostics (e.g. debug)",
        default_formats_help(probes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use vcsinfo_core::{all_probes, BzrProbe, CvsProbe, GitProbe, HgProbe};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_json_and_xml_conflict() {
        assert!(Cli::try_parse_from(["vcsinfo", "--json", "--xml"]).is_err());
        assert!(Cli::try_parse_from(["vcsinfo", "--json"]).is_ok());
    }

    #[test]
    fn test_indicator_defaults() {
        let cli = Cli::try_parse_from(["vcsinfo", "--format-modified", "M"]).unwrap();
        let options = cli.format_options();
        assert_eq!(options.has_modified, "M");
        assert_eq!(options.has_staged, "*");
        assert_eq!(options.has_stashed, "@");
        assert_eq!(options.has_new, "?");
    }

    #[test]
    fn test_default_formats_help_groups_probes() {
        let probes: Vec<&dyn VcsProbe> = vec![&HgProbe as &dyn VcsProbe, &GitProbe, &BzrProbe];
        assert_eq!(
            default_formats_help(&probes),
            "  git:\n    %n[%b%a%m%u%t]\n\n  bzr, hg:\n    %n[%b%m%u%t]"
        );
    }

    #[test]
    fn test_default_formats_help_lists_every_format() {
        let help = default_formats_help(&all_probes());
        assert!(help.contains("cvs:\n    %n[%e%m%u]"));
        assert!(help.contains("darcs, fossil, svn:\n    %n[%b%m%u]"));
        assert!(!help.ends_with('\n'));

        let probes: Vec<&dyn VcsProbe> = vec![&CvsProbe as &dyn VcsProbe];
        assert!(build_help(&probes).contains("%n[%e%m%u]"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~")), home);
            assert_eq!(expand_home(Path::new("~/code")), home.join("code"));
        }
    }

    #[test]
    fn test_determine_path() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "").unwrap();

        let resolved = determine_path(Some(&dir.join("..").join("dir"))).unwrap();
        assert_eq!(resolved, dir.canonicalize().unwrap());

        assert!(determine_path(Some(&file)).is_err());
        assert!(determine_path(Some(&temp.path().join("missing"))).is_err());
        assert!(determine_path(None).unwrap().is_absolute());
    }

    /// Collects everything the fmt subscriber writes.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs a failing invocation (bad format code inside a bare `.git`
    /// marker) under a subscriber built with `level`; returns the exit
    /// status and the log text.
    fn failing_run_logs(level: &str, extra: &[&str]) -> (u8, String) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let mut args = vec!["vcsinfo", "--path", temp.path().to_str().unwrap(), "-f", "%Q"];
        args.extend_from_slice(extra);
        let cli = Cli::try_parse_from(args).unwrap();

        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(level))
            .with_writer(move || writer.clone())
            .finish();

        let status = tracing::subscriber::with_default(subscriber, || {
            let probes: Vec<&'static dyn VcsProbe> = vec![&GitProbe as &dyn VcsProbe];
            exit_status(&cli, run(&cli, Ok(probes)))
        });

        let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        (status, logged)
    }

    #[test]
    fn test_quiet_failure_logs_nothing() {
        assert_eq!(default_log_level(false), "off");

        let (status, logged) = failing_run_logs(default_log_level(false), &[]);
        assert_eq!(status, 0);
        assert!(logged.is_empty(), "unexpected log output: {logged}");
    }

    #[test]
    fn test_verbose_failure_is_logged() {
        let (status, logged) = failing_run_logs(default_log_level(true), &[]);
        assert_eq!(status, 0);
        assert!(logged.contains("Unexpected formatting code"));
    }

    #[test]
    fn test_noisy_failure_exits_non_zero() {
        let (status, _) = failing_run_logs(default_log_level(false), &["--noisy"]);
        assert_eq!(status, 1);
    }
}
