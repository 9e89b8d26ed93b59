//! Host filesystem probing used by the device waiter and the reference
//! counter. Kept behind a trait so those can be exercised without real
//! device nodes.

use std::path::{Path, PathBuf};
use tracing::warn;

/// The narrow filesystem surface the attach logic relies on.
pub trait FsProbe: Send + Sync {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;
    /// Whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// Expand a glob pattern into its matches.
    fn glob(&self, pattern: &str) -> Vec<PathBuf>;
    /// List the entries of a directory.
    fn list_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>>;
}

/// Probe backed by the host filesystem.
pub struct HostFs;

impl FsProbe for HostFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        match glob::glob(pattern) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(error) => {
                warn!(%error, pattern, "invalid device path pattern");
                Vec::new()
            }
        }
    }

    fn list_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }
}
