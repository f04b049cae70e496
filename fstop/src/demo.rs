//! In-process stand-in for a cluster, used by `--demo`.
//!
//! Serves a FUSE, a kernel and a libcephfs client whose counters advance on
//! every query. A second FUSE client comes and goes so the table visibly grows
//! and shrinks.

use serde_json::{json, Map, Value};
use tracing::info;

use crate::cluster::{Cluster, STATS_MODULE};
use crate::error::{Result, SUPPORTED_VERSION};
use crate::metrics::METRICS;
use crate::types::ModuleList;

pub struct DemoCluster {
    version: i64,
    tick: u64,
}

impl Default for DemoCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoCluster {
    pub fn new() -> Self {
        Self::with_version(SUPPORTED_VERSION)
    }

    /// Reports `version` in every reply; anything but 1 exercises the mismatch banner.
    pub fn with_version(version: i64) -> Self {
        Self { version, tick: 0 }
    }

    fn snapshot(&self) -> Value {
        let t = self.tick;
        let all: Vec<String> = METRICS.iter().map(|m| m.name.to_ascii_lowercase()).collect();
        let mut metadata = Map::new();
        let mut metrics = Map::new();

        metadata.insert(
            "client.4305".into(),
            json!({
                "IP": "192.168.10.21", "hostname": "compute-01", "root": "/",
                "mount_point": "/mnt/cephfs", "valid_metrics": all
            }),
        );
        metrics.insert("client.4305".into(), counters(t, 1));

        metadata.insert(
            "client.4311".into(),
            json!({
                "IP": "192.168.10.22", "hostname": "compute-02", "root": "/volumes/_nogroup/data",
                "mount_point": "/mnt/data", "kernel_version": "5.14.0-70.el9.x86_64",
                "valid_metrics": &all[..4]
            }),
        );
        metrics.insert("client.4311".into(), counters(t, 2));

        metadata.insert(
            "client.4420".into(),
            json!({
                "IP": "192.168.10.40", "hostname": "nfs-gw", "root": "/",
                "mount_point": "N/A", "valid_metrics": ["cap_hit", "dentry_lease", "opened_files"]
            }),
        );
        metrics.insert("client.4420".into(), counters(t, 3));

        if t % 10 >= 5 {
            metadata.insert(
                "client.4502".into(),
                json!({
                    "IP": "192.168.10.23", "hostname": "compute-03", "root": "/home",
                    "mount_point": "/home", "valid_metrics": all
                }),
            );
            metrics.insert("client.4502".into(), counters(t, 4));
        }

        json!({
            "version": self.version,
            "global_counters": all,
            "counters": [],
            "client_metadata": metadata,
            "global_metrics": metrics,
            "metrics": {"delayed_ranks": []}
        })
    }
}

/// One pair per tracked metric, advancing with `t` and varied by `seed`.
fn counters(t: u64, seed: u64) -> Value {
    let lat = |scale: u64| json!([t * seed / scale, (t * 123_456_789 * seed) % 1_000_000_000]);
    json!([
        [100 * t * seed + 37, 3 * t + seed],
        lat(40),
        lat(25),
        lat(60),
        [20 * t + seed, t / 2],
        [seed * 8 + t % 5, 0],
        [seed * 120 + t, 0],
        [seed * 64 + t % 7, 0]
    ])
}

impl Cluster for DemoCluster {
    async fn module_list(&mut self) -> Result<ModuleList> {
        Ok(ModuleList {
            enabled_modules: vec!["iostat".into(), "restful".into(), STATS_MODULE.into()],
        })
    }

    async fn perf_stats(&mut self) -> Result<Value> {
        self.tick += 1;
        Ok(self.snapshot())
    }

    async fn shutdown(&mut self) {
        info!(ticks = self.tick, "demo cluster stopped");
    }
}
