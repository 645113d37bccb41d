//! Error types for vcsinfo-core.
//!
//! This module defines a custom error type using `thiserror` for the library's
//! public API, while the `vcsinfo` binary uses `anyhow` on top of it.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A specialized Result type for vcsinfo-core operations.
///
/// # Example
///
/// ```
/// use vcsinfo_core::Result;
///
/// fn detect() -> Result<String> {
///     Ok("git".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while detecting, inspecting, or rendering a repository.
///
/// None of these are fatal to the library: probes collect them into a list
/// next to a best-effort [`VcsInfo`](crate::VcsInfo), and the caller decides
/// what to show the user.
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error occurred while inspecting the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No repository root was found walking up from the requested path.
    #[error("Could not find a {vcs} repository root above {path}")]
    NoRepositoryRoot {
        /// Name of the probe that was looking.
        vcs: String,
        /// The path the walk started from.
        path: PathBuf,
    },

    /// An external tool could not be started.
    #[error("Failed to run {program}: {source}")]
    CommandSpawn {
        /// The program that was being started.
        program: String,
        /// The underlying spawn or wait error.
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully for a reason the probe does not
    /// consider benign.
    #[error("`{command}` failed with {}: {stderr}", describe_exit(.code))]
    CommandFailed {
        /// The full command line, for display.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An external tool ran past the configured timeout and was killed.
    #[error("`{command}` timed out after {timeout:?}")]
    CommandTimeout {
        /// The full command line, for display.
        command: String,
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// An external tool produced output the probe could not interpret.
    #[error("Unexpected output from {program}: {message}")]
    UnexpectedOutput {
        /// The program whose output was rejected.
        program: String,
        /// What was wrong with it.
        message: String,
    },

    /// A format string contained an unknown `%` token.
    #[error("Unexpected formatting code \"%{0}\"")]
    UnknownFormatCode(char),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

// Helper constructors for common error cases
impl Error {
    /// Creates a NoRepositoryRoot error.
    pub fn no_repository_root(vcs: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::NoRepositoryRoot {
            vcs: vcs.into(),
            path: path.into(),
        }
    }

    /// Creates a CommandSpawn error.
    pub fn command_spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Error::CommandSpawn {
            program: program.into(),
            source,
        }
    }

    /// Creates a CommandFailed error.
    pub fn command_failed(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Error::CommandFailed {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Creates a CommandTimeout error.
    pub fn command_timeout(command: impl Into<String>, timeout: Duration) -> Self {
        Error::CommandTimeout {
            command: command.into(),
            timeout,
        }
    }

    /// Creates an UnexpectedOutput error.
    pub fn unexpected_output(program: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UnexpectedOutput {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Creates an Other error.
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}
