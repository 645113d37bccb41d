//! Running external VCS tools.
//!
//! Probes never spawn processes directly; they go through a [`CommandRunner`],
//! which captures output as lines and optionally enforces a timeout. A
//! non-zero exit status is not an error at this level: probes inspect the
//! [`CommandOutput`] themselves, because several tools report benign
//! conditions (no commits yet, extension disabled) that way.

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Returns true if `program` can be found on `PATH`.
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Human-readable command line, used in error messages.
    pub command: String,
    /// Exit code; `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, split into lines.
    pub stdout: Vec<String>,
    /// Standard error, split into lines.
    pub stderr: Vec<String>,
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// All output lines, stdout first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.iter().chain(self.stderr.iter()).map(String::as_str)
    }

    /// Whether any output line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines().any(|line| line.contains(needle))
    }

    /// The first line of standard output, if any.
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.first().map(String::as_str)
    }

    /// Converts an unsuccessful exit into [`Error::CommandFailed`].
    pub fn check(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(self.failure())
        }
    }

    /// Builds the [`Error::CommandFailed`] describing this output.
    pub fn failure(&self) -> Error {
        Error::command_failed(&self.command, self.code, self.stderr.join("\n").trim())
    }
}

/// Spawns external tools on behalf of probes.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use std::time::Duration;
/// use vcsinfo_core::CommandRunner;
///
/// let runner = CommandRunner::new().with_timeout(Some(Duration::from_secs(2)));
/// let output = runner.run(Path::new("."), "git", &["status", "--porcelain"])?;
/// println!("{} changed files", output.stdout.len());
/// # Ok::<(), vcsinfo_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    /// Maximum wall-clock time per command. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl CommandRunner {
    /// Creates a runner with no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-command timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `program` with `args` in `dir` and captures its output.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be started or waited on,
    /// or if it exceeds the timeout. Exit status is reported in the output.
    pub fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let command_line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command_line, dir = %dir.display(), "running");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let (code, stdout, stderr) = match self.timeout {
            None => {
                let output = cmd
                    .output()
                    .map_err(|e| Error::command_spawn(program, e))?;
                (output.status.code(), output.stdout, output.stderr)
            }
            Some(timeout) => {
                let mut child = cmd.spawn().map_err(|e| Error::command_spawn(program, e))?;

                // Drain both pipes while waiting so a chatty tool can't block on a full pipe.
                let stdout_reader = child.stdout.take().map(spawn_reader);
                let stderr_reader = child.stderr.take().map(spawn_reader);

                let status = match child
                    .wait_timeout(timeout)
                    .map_err(|e| Error::command_spawn(program, e))?
                {
                    Some(status) => status,
                    None => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::command_timeout(command_line, timeout));
                    }
                };

                (
                    status.code(),
                    join_reader(stdout_reader),
                    join_reader(stderr_reader),
                )
            }
        };

        let output = CommandOutput {
            command: command_line,
            code,
            stdout: split_lines(&stdout),
            stderr: split_lines(&stderr),
        };
        debug!(command = %output.command, code = ?output.code, "finished");
        Ok(output)
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(reader: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Splits raw process output into lines, dropping line terminators.
fn split_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}
