//! Choosing the probe responsible for a path.

use crate::error::Result;
use crate::probe::VcsProbe;
use crate::resolver::{file_exists, find_acceptable_path};
use std::path::Path;
use tracing::debug;

/// Name of the marker file that disables detection for a directory tree.
pub const OPT_OUT_SENTINEL: &str = ".novcsinfo";

/// Finds the probe whose repository most closely encloses `path`.
///
/// Walks from `path` upwards. At each directory the opt-out sentinel is
/// checked first: if present, the walk stops and no probe is selected. Then
/// each probe's [`is_repository_root`](VcsProbe::is_repository_root) is tried
/// in the order given; the first match wins.
///
/// Returns `Ok(None)` when nothing is found or the path is opted out.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use vcsinfo_core::{all_probes, find_probe_for_path};
///
/// let probes = all_probes();
/// if let Some(probe) = find_probe_for_path(Path::new("/work/repo/src"), &probes)? {
///     println!("managed by {}", probe.name());
/// }
/// # Ok::<(), vcsinfo_core::Error>(())
/// ```
pub fn find_probe_for_path<'p>(
    path: &Path,
    probes: &[&'p dyn VcsProbe],
) -> Result<Option<&'p dyn VcsProbe>> {
    let mut selected: Option<&'p dyn VcsProbe> = None;
    let mut opted_out = false;

    find_acceptable_path(path, |dir| {
        if file_exists(&dir.join(OPT_OUT_SENTINEL))? {
            debug!(dir = %dir.display(), "detection disabled by sentinel");
            opted_out = true;
            return Ok(true);
        }

        for &probe in probes {
            if probe.is_repository_root(dir)? {
                debug!(vcs = probe.name(), root = %dir.display(), "selected probe");
                selected = Some(probe);
                return Ok(true);
            }
        }

        Ok(false)
    })?;

    if opted_out {
        return Ok(None);
    }
    Ok(selected)
}
