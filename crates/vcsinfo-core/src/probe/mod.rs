//! The probe contract and the built-in probes.
//!
//! Every supported VCS is a stateless unit struct implementing [`VcsProbe`].
//! The set is closed: [`all_probes`] lists the seven of them in the fixed
//! order used to break ties when one directory looks like the root of more
//! than one kind of repository.

use crate::command::CommandRunner;
use crate::error::{Error, Result};
use crate::models::VcsInfo;
use std::fmt;
use std::path::Path;

mod bzr;
mod cvs;
mod darcs;
mod fossil;
mod git;
mod hg;
mod svn;

pub use bzr::BzrProbe;
pub use cvs::CvsProbe;
pub use darcs::DarcsProbe;
pub use fossil::FossilProbe;
pub use git::GitProbe;
pub use hg::HgProbe;
pub use svn::SvnProbe;

/// A backend capable of examining one kind of VCS repository.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use vcsinfo_core::{CommandRunner, GitProbe, VcsProbe};
///
/// let probe = GitProbe;
/// if probe.is_available()? && probe.is_repository_root(Path::new("/work/repo"))? {
///     let (info, errors) = probe.gather_info(Path::new("/work/repo"), &CommandRunner::new());
///     println!("{} on {} ({} problems)", info.vcs_name, info.branch, errors.len());
/// }
/// # Ok::<(), vcsinfo_core::Error>(())
/// ```
pub trait VcsProbe: Send + Sync + fmt::Debug {
    /// Stable lowercase identifier, e.g. `"git"`.
    fn name(&self) -> &'static str;

    /// The format string used when the caller does not supply one.
    fn default_format(&self) -> &'static str;

    /// Whether the backend's command-line tool is installed.
    fn is_available(&self) -> Result<bool>;

    /// Whether `path` is exactly the root of a repository of this kind.
    ///
    /// This only looks for marker files and never runs the VCS tool, since it
    /// is evaluated once per ancestor directory during a walk.
    fn is_repository_root(&self, path: &Path) -> Result<bool>;

    /// Extracts the state of the repository containing `path`.
    ///
    /// Never fails outright: the record is filled with whatever could be
    /// determined, and every problem encountered is returned next to it.
    fn gather_info(&self, path: &Path, runner: &CommandRunner) -> (VcsInfo, Vec<Error>);
}

static GIT: GitProbe = GitProbe;
static HG: HgProbe = HgProbe;
static SVN: SvnProbe = SvnProbe;
static BZR: BzrProbe = BzrProbe;
static FOSSIL: FossilProbe = FossilProbe;
static DARCS: DarcsProbe = DarcsProbe;
static CVS: CvsProbe = CvsProbe;

/// Every known probe, in detection-precedence order.
pub fn all_probes() -> Vec<&'static dyn VcsProbe> {
    vec![
        &GIT as &dyn VcsProbe,
        &HG,
        &SVN,
        &BZR,
        &FOSSIL,
        &DARCS,
        &CVS,
    ]
}

/// The probes whose tools are installed, in detection-precedence order.
///
/// # Errors
///
/// Returns the first error reported by a probe's availability check.
pub fn available_probes() -> Result<Vec<&'static dyn VcsProbe>> {
    let mut available = Vec::new();

    for probe in all_probes() {
        if probe.is_available()? {
            available.push(probe);
        } else {
            tracing::debug!(vcs = probe.name(), "tool not found, probe disabled");
        }
    }

    Ok(available)
}

/// Looks up a probe by its name.
pub fn probe_by_name(name: &str) -> Option<&'static dyn VcsProbe> {
    all_probes().into_iter().find(|probe| probe.name() == name)
}
