//! Validates one `fs perf stats` reply and indexes it for rendering.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DecodeError, SUPPORTED_VERSION};
use crate::metrics::CounterPair;
use crate::types::{ClientMetadata, PerfStatsReply};

/// Placeholder the MDS uses for clients without a mount point.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMeta {
    pub mount_point: Option<String>,
    pub mount_root: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    /// Lower-case counter names this client reports.
    pub valid_metrics: HashSet<String>,
    pub is_kernel_client: bool,
}

impl ClientMeta {
    /// True for clients with a real mount point (FUSE or kernel).
    pub fn is_mounted(&self) -> bool {
        self.mount_point
            .as_deref()
            .is_some_and(|mp| mp != NOT_AVAILABLE)
    }

    pub fn supports(&self, counter: &str) -> bool {
        self.valid_metrics.contains(&counter.to_ascii_lowercase())
    }

    /// `mount_point@hostname/ip`, if all three are known.
    pub fn mount_host_addr(&self) -> Option<String> {
        match (&self.mount_point, &self.hostname, &self.ip) {
            (Some(mp), Some(host), Some(ip)) => Some(format!("{mp}@{host}/{ip}")),
            _ => None,
        }
    }
}

impl From<ClientMetadata> for ClientMeta {
    fn from(m: ClientMetadata) -> Self {
        Self {
            mount_point: m.mount_point,
            mount_root: m.root,
            hostname: m.hostname,
            ip: m.ip,
            valid_metrics: m
                .valid_metrics
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            is_kernel_client: m.kernel_version.is_some(),
        }
    }
}

/// Client counts shown on the second header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientSummary {
    pub clients: usize,
    pub fuse: usize,
    pub kernel: usize,
    pub libs: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub version: i64,
    pub client_metadata: HashMap<String, ClientMeta>,
    pub global_counters: Vec<String>,
    /// In reply order; every id has an entry in `client_metadata`.
    pub global_metrics: Vec<(String, Vec<CounterPair>)>,
}

/// One body row: client id, its metadata and one counter pair per global counter.
pub struct ClientRow<'a> {
    pub id: &'a str,
    pub meta: &'a ClientMeta,
    pub counters: &'a [CounterPair],
}

impl Snapshot {
    /// Rows in reply order. Every id in `global_metrics` must have metadata;
    /// [`decode`] guarantees it, hand-built snapshots must too.
    pub fn rows(&self) -> impl Iterator<Item = ClientRow<'_>> {
        self.global_metrics.iter().filter_map(|(id, counters)| {
            let meta = self.client_metadata.get(id);
            debug_assert!(meta.is_some(), "client {id} has metrics but no metadata");
            meta.map(|meta| ClientRow {
                id,
                meta,
                counters,
            })
        })
    }

    pub fn summary(&self) -> ClientSummary {
        let clients = self.client_metadata.len();
        let kernel = self
            .client_metadata
            .values()
            .filter(|m| m.is_kernel_client)
            .count();
        let fuse = self
            .client_metadata
            .values()
            .filter(|m| m.is_mounted() && !m.is_kernel_client)
            .count();
        ClientSummary {
            clients,
            fuse,
            kernel,
            libs: clients.saturating_sub(fuse + kernel),
        }
    }
}

/// Decodes a reply. The version is checked before anything else so replies from a
/// newer stats module report a mismatch rather than a shape error.
pub fn decode(raw: &Value) -> Result<Snapshot, DecodeError> {
    let version = raw
        .get("version")
        .ok_or_else(|| DecodeError::Malformed("missing 'version'".into()))?
        .as_i64()
        .ok_or_else(|| DecodeError::Malformed("'version' is not an integer".into()))?;
    if version != SUPPORTED_VERSION {
        return Err(DecodeError::VersionMismatch { found: version });
    }

    let reply =
        PerfStatsReply::deserialize(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let ncounters = reply.global_counters.len();
    for (id, counters) in &reply.global_metrics.0 {
        if !reply.client_metadata.contains_key(id) {
            return Err(DecodeError::Malformed(format!(
                "client {id} has metrics but no metadata"
            )));
        }
        if counters.len() != ncounters {
            return Err(DecodeError::Malformed(format!(
                "client {id} reports {} counters, expected {ncounters}",
                counters.len()
            )));
        }
    }

    Ok(Snapshot {
        version,
        client_metadata: reply
            .client_metadata
            .into_iter()
            .map(|(id, m)| (id, ClientMeta::from(m)))
            .collect(),
        global_counters: reply.global_counters,
        global_metrics: reply.global_metrics.0,
    })
}
