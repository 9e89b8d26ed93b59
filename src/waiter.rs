//! Bounded polling for a just-attached block device node to appear.

use crate::{probe::FsProbe, record::DEFAULT_TRANSPORT};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::time::sleep;
use tracing::debug;

/// Delay between poll attempts.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Poll until the device node at `path` appears, returning the resolved
/// concrete path, or `None` once `max_retries` attempts are exhausted.
/// A missing device within the budget is an expected outcome, not an error.
///
/// For the default tcp transport the literal path is stat'ed. Any other
/// transport gets glob expansion, since vendor drivers insert their own
/// segments into the by-path name (e.g. a pci address); the device exists
/// once expansion yields at least one match, and the first match is the
/// node handed to downstream code.
pub async fn wait_for_path(
    fs: &dyn FsProbe,
    path: &str,
    max_retries: u32,
    transport: &str,
) -> Option<PathBuf> {
    for attempt in 1 ..= max_retries {
        if transport == DEFAULT_TRANSPORT {
            if fs.exists(Path::new(path)) {
                return Some(PathBuf::from(path));
            }
        } else if let Some(first) = fs.glob(path).into_iter().next() {
            return Some(first);
        }
        debug!(path, attempt, "device path not present yet");
        if attempt < max_retries {
            sleep(RETRY_DELAY).await;
        }
    }
    None
}
