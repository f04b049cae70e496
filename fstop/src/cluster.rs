//! Cluster command channel: the `ceph` CLI client and the capability check every backend shares.

use std::path::PathBuf;
use std::process::Stdio;

use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{FsTopError, Result};
use crate::types::ModuleList;

/// mgr module that serves `fs perf stats`.
pub const STATS_MODULE: &str = "stats";

/// Seconds the CLI waits for the monitors before giving up.
const CONNECT_TIMEOUT_SECS: u32 = 10;

/// Administrative commands the dashboard needs from the cluster.
#[allow(async_fn_in_trait)]
pub trait Cluster {
    /// `mgr module ls`
    async fn module_list(&mut self) -> Result<ModuleList>;
    /// `fs perf stats`, as raw JSON; decoding is the caller's job.
    async fn perf_stats(&mut self) -> Result<Value>;
    /// Releases the connection. Called exactly once, on every exit path.
    async fn shutdown(&mut self);
}

/// Fails unless the `stats` mgr module is enabled.
pub async fn verify_perf_stats_support<C: Cluster>(cluster: &mut C) -> Result<()> {
    let modules = cluster.module_list().await?;
    if !modules.enabled_modules.iter().any(|m| m == STATS_MODULE) {
        return Err(FsTopError::CapabilityMissing(STATS_MODULE.into()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CephOptions {
    pub ceph_bin: PathBuf,
    pub cluster: String,
    pub id: String,
    pub conffile: Option<PathBuf>,
}

/// Talks to the cluster through the `ceph` command line tool, one process per command.
pub struct CephCli {
    opts: CephOptions,
}

enum RunError {
    Spawn(std::io::Error),
    Status(String),
}

impl RunError {
    fn reason(self) -> String {
        match self {
            RunError::Spawn(e) => format!("failed to run ceph: {e}"),
            RunError::Status(stderr) => stderr,
        }
    }
}

impl CephCli {
    /// Checks that the monitors answer with the given identity before handing out a client.
    pub async fn connect(opts: CephOptions) -> Result<Self> {
        let cli = Self { opts };
        match cli.run(&["health"]).await {
            Ok(_) => {
                info!(cluster = %cli.opts.cluster, id = %cli.opts.id, "connected");
                Ok(cli)
            }
            Err(RunError::Status(stderr))
                if stderr.contains("ObjectNotFound") || stderr.contains("conf_read_file") =>
            {
                Err(FsTopError::ClusterNotFound(cli.opts.cluster.clone()))
            }
            Err(e) => Err(FsTopError::Connection(e.reason())),
        }
    }

    fn command(&self, words: &[&str]) -> Command {
        let mut cmd = Command::new(&self.opts.ceph_bin);
        cmd.arg("--cluster")
            .arg(&self.opts.cluster)
            .arg("--id")
            .arg(&self.opts.id);
        if let Some(conf) = &self.opts.conffile {
            cmd.arg("--conf").arg(conf);
        }
        cmd.arg("--connect-timeout")
            .arg(CONNECT_TIMEOUT_SECS.to_string())
            .args(words)
            .args(["--format", "json"])
            .stdin(Stdio::null())
            .kill_on_drop(true);
        // keep terminal signals meant for fstop away from an in-flight query
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    async fn run(&self, words: &[&str]) -> std::result::Result<Vec<u8>, RunError> {
        debug!(command = %words.join(" "), "ceph");
        let out = self
            .command(words)
            .output()
            .await
            .map_err(RunError::Spawn)?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            return Err(RunError::Status(if stderr.is_empty() {
                format!("ceph exited with {}", out.status)
            } else {
                stderr
            }));
        }
        Ok(out.stdout)
    }
}

impl Cluster for CephCli {
    async fn module_list(&mut self) -> Result<ModuleList> {
        let check = |reason: String| FsTopError::CapabilityCheck {
            module: STATS_MODULE.into(),
            reason,
        };
        let out = self
            .run(&["mgr", "module", "ls"])
            .await
            .map_err(|e| check(e.reason()))?;
        serde_json::from_slice(&out).map_err(|e| check(e.to_string()))
    }

    async fn perf_stats(&mut self) -> Result<Value> {
        let out = self
            .run(&["fs", "perf", "stats"])
            .await
            .map_err(|e| FsTopError::Query(e.reason()))?;
        serde_json::from_slice(&out).map_err(|e| FsTopError::Query(e.to_string()))
    }

    async fn shutdown(&mut self) {
        // nothing is held open between commands
        info!(cluster = %self.opts.cluster, "disconnected");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    const FAKE_CEPH: &str = r#"#!/bin/sh
echo "$@" >> "$0.log"
case "$*" in
  *"mgr module ls"*) echo '{"always_on_modules":["balancer"],"enabled_modules":["iostat","stats"]}' ;;
  *"fs perf stats"*)
    pgid=$(cut -d' ' -f5 /proc/$$/stat 2>/dev/null || echo 0)
    echo "{\"version\": 1, \"pid\": $$, \"pgid\": ${pgid:-0}}" ;;
  *health*) echo '{"status":"HEALTH_OK"}' ;;
  *) exit 22 ;;
esac
"#;

    const MISSING_CLUSTER: &str = r#"#!/bin/sh
echo "Error initializing cluster client: ObjectNotFound('RADOS object not found (error calling conf_read_file)')" >&2
exit 1
"#;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn opts(bin: PathBuf) -> CephOptions {
        CephOptions {
            ceph_bin: bin,
            cluster: "ceph".into(),
            id: "fstop".into(),
            conffile: Some(PathBuf::from("/etc/ceph/test.conf")),
        }
    }

    // One test so no other spawn can race the script writes.
    #[tokio::test]
    async fn drives_the_ceph_cli() {
        let dir = tempfile::tempdir().unwrap();
        let fake = script(dir.path(), "ceph", FAKE_CEPH);
        let missing = script(dir.path(), "ceph-missing", MISSING_CLUSTER);

        let mut cli = CephCli::connect(opts(fake.clone())).await.unwrap();
        verify_perf_stats_support(&mut cli).await.unwrap();
        let stats = cli.perf_stats().await.unwrap();
        assert_eq!(stats["version"], 1);
        if cfg!(target_os = "linux") {
            // the child leads its own process group
            assert_eq!(stats["pgid"], stats["pid"], "{stats}");
        }
        cli.shutdown().await;

        let log = fs::read_to_string(dir.path().join("ceph.log")).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(
            lines,
            [
                "--cluster ceph --id fstop --conf /etc/ceph/test.conf --connect-timeout 10 health --format json",
                "--cluster ceph --id fstop --conf /etc/ceph/test.conf --connect-timeout 10 mgr module ls --format json",
                "--cluster ceph --id fstop --conf /etc/ceph/test.conf --connect-timeout 10 fs perf stats --format json",
            ]
        );

        let err = CephCli::connect(opts(missing)).await.err().unwrap();
        assert!(matches!(err, FsTopError::ClusterNotFound(ref c) if c == "ceph"), "{err}");
        assert_eq!(err.to_string(), "cluster ceph does not exist");

        let err = CephCli::connect(opts(dir.path().join("no-such-binary")))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FsTopError::Connection(_)), "{err}");
    }
}
