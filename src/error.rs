//! Definition of the error type shared by the attach and detach helpers.
use snafu::Snafu;
use std::path::PathBuf;

/// An iSCSI device-path, record or interface management error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), context(suffix(false)))]
pub enum IscsiError {
    #[snafu(display("Malformed mount path '{path}': missing device segment"))]
    MalformedPath { path: String },
    #[snafu(display("Malformed device descriptor '{device}': missing lun marker"))]
    MalformedDevice { device: String },
    #[snafu(display("Invalid record line '{line}': expected 'key = value'"))]
    InvalidRecordLine { line: String },
    #[snafu(display("{command} failed: {output}"))]
    ExternalTool { command: String, output: String },
    #[snafu(display("I/O error on '{}': {source}", path.display()))]
    Filesystem {
        source: std::io::Error,
        path: PathBuf,
    },
}
