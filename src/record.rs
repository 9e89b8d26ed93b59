//! Parsing of the initiator tool's interface record output.
//!
//! A record is line-oriented text bounded by `# BEGIN RECORD <version>` and
//! `# END RECORD` markers, with `key = value` lines in between. Parameters
//! the tool has no value for are printed with the `<empty>` sentinel and
//! are dropped from the parsed record outright, so "key absent" and "value
//! was empty" are indistinguishable downstream.

use crate::error::{InvalidRecordLine, IscsiError};
use snafu::ensure;
use std::collections::HashMap;

/// Value the tool prints for parameters that are not set.
pub(crate) const EMPTY_SENTINEL: &str = "<empty>";
/// Transport used when an interface record does not name one.
pub const DEFAULT_TRANSPORT: &str = "tcp";
/// Record key holding the transport name.
pub(crate) const TRANSPORT_NAME_KEY: &str = "iface.transport_name";

/// Parse `-o show` output into a key/value record.
///
/// Marker and blank lines are structural and skipped; every other line must
/// be `key = value` with whitespace around the `=`.
pub fn parse_iscsiadm_show(output: &str) -> Result<HashMap<String, String>, IscsiError> {
    let mut record = HashMap::new();
    for line in output.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        ensure!(
            fields.len() == 3 && fields[1] == "=",
            InvalidRecordLine { line }
        );
        if fields[2] != EMPTY_SENTINEL {
            record.insert(fields[0].to_string(), fields[2].to_string());
        }
    }
    Ok(record)
}

/// The transport name recorded for an interface, defaulting to tcp when
/// the record does not carry one. The parser drops `<empty>` values before
/// they reach here, so an unset transport also resolves to the default.
pub fn transport_name(record: &HashMap<String, String>) -> String {
    record
        .get(TRANSPORT_NAME_KEY)
        .cloned()
        .unwrap_or_else(|| DEFAULT_TRANSPORT.to_string())
}
