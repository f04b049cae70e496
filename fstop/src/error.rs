//! Error taxonomy shared by the cluster client, the decoder and the poll loop.

use thiserror::Error;

/// Protocol version of the `fs perf stats` reply this dashboard understands.
pub const SUPPORTED_VERSION: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("perf stats version mismatch! (got {found}, expected {SUPPORTED_VERSION})")]
    VersionMismatch { found: i64 },
    #[error("malformed perf stats reply: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum FsTopError {
    #[error("cluster {0} does not exist")]
    ClusterNotFound(String),
    #[error("error connecting to cluster: {0}")]
    Connection(String),
    #[error("error checking '{module}' module: {reason}")]
    CapabilityCheck { module: String, reason: String },
    #[error("'{0}' module not enabled. Use 'ceph mgr module enable {0}' to enable")]
    CapabilityMissing(String),
    #[error("error in 'perf stats' query: {0}")]
    Query(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

pub type Result<T, E = FsTopError> = std::result::Result<T, E>;
