//! Decomposition of device-mapper mount paths into their iSCSI constituents.
//!
//! A mount path produced for an attached lun has the shape
//! `<root>/iface-<name>/<portal>-<target>-lun-<n>`, where the target is
//! either an iqn (`iqn.2014-12.com.example:tgt`) or an eui
//! (`eui.02004567A425678D`) literal. The target itself may contain `-`,
//! `:` and `.`, so splitting anchors on the `-lun-` marker and the
//! `host:port` portal shape rather than on delimiter counts.

use crate::error::{IscsiError, MalformedDevice, MalformedPath};
use regex::Regex;
use snafu::OptionExt;

/// Marker separating the connection identifier from the lun number.
pub(crate) const LUN_MARKER: &str = "-lun-";

lazy_static::lazy_static! {
    /// An interface path segment, e.g. `/iface-default/`. The surrounding
    /// slashes keep a device descriptor containing `iface-` from matching.
    static ref IFACE_RE: Regex = Regex::new(r".+/iface-([^/]+)/").unwrap();
    /// `host:port-target` connection identifier. The portal match is lazy
    /// and the target anchored on its `iqn.`/`eui.` prefix, so the first
    /// `-` after the port is the split point even when the target carries
    /// further dashes.
    static ref CONN_RE: Regex = Regex::new(r"^(.+?:\d+)-((?:iqn|eui)\..+)$").unwrap();
}

/// Split a mount path into its trailing device descriptor and the prefix
/// running up to the last lun marker.
pub fn extract_device_and_prefix(mount_path: &str) -> Result<(String, String), IscsiError> {
    let (_, device) = mount_path
        .rsplit_once('/')
        .context(MalformedPath { path: mount_path })?;
    let lun = mount_path
        .rfind(LUN_MARKER)
        .context(MalformedPath { path: mount_path })?;
    Ok((device.to_string(), mount_path[.. lun].to_string()))
}

/// The name of the `/iface-<name>/` segment of a mount path, if any.
pub fn extract_iface(mount_path: &str) -> Option<&str> {
    IFACE_RE
        .captures(mount_path)
        .map(|captures| captures.get(1).unwrap().as_str())
}

/// Split a device descriptor (`<portal>-<target>-lun-<n>`) into its portal
/// and target name.
pub fn extract_portal_and_iqn(device: &str) -> Result<(String, String), IscsiError> {
    let lun = device
        .rfind(LUN_MARKER)
        .context(MalformedDevice { device })?;
    let captures = CONN_RE
        .captures(&device[.. lun])
        .context(MalformedDevice { device })?;
    Ok((captures[1].to_string(), captures[2].to_string()))
}

/// Deduplicate a portal list, preserving first-seen order, so a multipath
/// session logs in once per distinct portal.
pub fn remove_duplicate(portals: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(portals.len());
    for portal in portals {
        if !unique.contains(&portal) {
            unique.push(portal);
        }
    }
    unique
}
