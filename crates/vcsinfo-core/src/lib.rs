//! # vcsinfo-core
//!
//! A library for finding out which version-control system manages a
//! directory and summarizing the state of that repository, typically for a
//! shell prompt.
//!
//! ## Features
//!
//! - **Seven backends**: git, Mercurial, Subversion, Bazaar, Fossil, Darcs and CVS
//! - **Nearest-root detection** with a `.novcsinfo` opt-out file
//! - **Concurrent extraction**: each probe runs its tool invocations in parallel
//!   and tolerates individual failures
//! - **Format strings** (`%n[%b%m%u]`), **JSON** and **XML** output
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use vcsinfo_core::{available_probes, find_probe_for_path, render, CommandRunner, FormatOptions};
//!
//! let probes = available_probes()?;
//! let path = Path::new("/home/user/projects/app");
//!
//! if let Some(probe) = find_probe_for_path(path, &probes)? {
//!     let (info, _errors) = probe.gather_info(path, &CommandRunner::new());
//!     println!("{}", render(&info, probe.default_format(), &FormatOptions::default())?);
//! }
//! # Ok::<(), vcsinfo_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`models`] - The [`VcsInfo`] snapshot and [`FormatOptions`]
//! - [`probe`] - The [`VcsProbe`] trait and the seven backends
//! - [`resolver`] - Upward directory walks
//! - [`selector`] - Choosing the probe for a path
//! - [`orchestrator`] - Running a probe's subtasks concurrently
//! - [`command`] - Spawning the external tools
//! - [`format`] - The format string interpreter
//! - [`structured`] - JSON and XML output
//! - [`error`] - Custom error types
//!
//! ## CLI Binary
//!
//! This crate also provides a `vcsinfo` binary. See its `--help` output for
//! the format codes and environment variables.

// Module declarations
pub mod command;
pub mod error;
pub mod format;
pub mod models;
pub mod orchestrator;
pub mod probe;
pub mod resolver;
pub mod selector;
pub mod structured;

// Re-export commonly used types for convenience
pub use command::{CommandOutput, CommandRunner};
pub use error::{Error, Result};
pub use format::render;
pub use models::{FormatOptions, VcsInfo};
pub use probe::{
    all_probes, available_probes, probe_by_name, BzrProbe, CvsProbe, DarcsProbe, FossilProbe,
    GitProbe, HgProbe, SvnProbe, VcsProbe,
};
pub use selector::{find_probe_for_path, OPT_OUT_SENTINEL};
pub use structured::{to_json, to_xml};

/// Library version, derived from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
