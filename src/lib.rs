//! Helpers for attaching and detaching iSCSI-backed volumes on a node:
//! decomposing the device-mapper mount paths the OS produces, parsing the
//! initiator tool's record output, waiting for a freshly attached device
//! node to appear, cloning interface profiles for multipath login and
//! counting live session references to decide when a logout is safe.
//!
//! Process execution and filesystem access go through the narrow
//! [`exec::Executor`] and [`probe::FsProbe`] seams so every component can
//! be exercised without real devices or a running initiator daemon.

/// Device/mount path decomposition.
pub mod devpath;
/// Error definitions.
pub mod error;
/// External command execution.
pub mod exec;
/// Interface profile management.
pub mod iface;
/// Host filesystem probing.
pub mod probe;
/// Initiator tool record parsing.
pub mod record;
/// Session reference counting.
pub mod refcount;
/// Device node polling.
pub mod waiter;

pub use error::IscsiError;
