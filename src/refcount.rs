//! Counting live session references for a portal/target pair.
//!
//! Each attached lun leaves a directory node
//! `<root>/iface-<id>/<portal>-<target>-lun-<n>` behind, and a target is
//! only safe to log out once no such node remains for it. The scan is a
//! read-only point-in-time snapshot; racing attach/detach can only make it
//! undercount, which callers must tolerate.

use crate::{
    devpath::LUN_MARKER,
    error::{Filesystem, IscsiError},
    probe::FsProbe,
};
use snafu::ResultExt;
use std::path::Path;

/// Count the session directories under `root` referring to `portal` and
/// `target`, across all interface subdirectories (a multipath target is
/// reachable via several interfaces). A `root` that was never created
/// means no session exists and counts as zero.
pub fn target_ref_count(
    fs: &dyn FsProbe,
    root: &Path,
    portal: &str,
    target: &str,
) -> Result<usize, IscsiError> {
    let iface_dirs = match fs.list_dir(root) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(error) => return Err(error).context(Filesystem { path: root }),
    };

    let leaf_prefix = format!("{portal}-{target}{LUN_MARKER}");
    let mut total = 0;
    for iface_dir in iface_dirs {
        if !fs.is_dir(&iface_dir) {
            continue;
        }
        for session in fs
            .list_dir(&iface_dir)
            .context(Filesystem { path: &iface_dir })?
        {
            let name = session.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if let Some(lun) = name.strip_prefix(&leaf_prefix) {
                if !lun.is_empty() && lun.bytes().all(|b| b.is_ascii_digit()) {
                    total += 1;
                }
            }
        }
    }
    Ok(total)
}
