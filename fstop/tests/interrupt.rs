//! A stop request that lands while `ceph` is still answering ends the session cleanly.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::time::sleep;

use fstop::app::{poll_loop, StopFlag};
use fstop::cluster::{CephCli, CephOptions};
use fstop::metrics::METRICS;
use fstop::ui::dashboard::Dashboard;
use fstop::ui::surface::Panes;

const SLOW_CEPH: &str = r#"#!/bin/sh
case "$*" in
  *"fs perf stats"*)
    echo $$ > "$0.pid"
    sleep 3
    echo '{"version": 1, "global_counters": [], "client_metadata": {}, "global_metrics": {}}' ;;
  *) echo '{}' ;;
esac
"#;

#[tokio::test]
async fn interrupted_query_is_a_clean_stop() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("ceph");
    fs::write(&fake, SLOW_CEPH).unwrap();
    fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();
    let pid_file: PathBuf = dir.path().join("ceph.pid");

    let mut cluster = CephCli::connect(CephOptions {
        ceph_bin: fake,
        cluster: "ceph".into(),
        id: "fstop".into(),
        conffile: None,
    })
    .await
    .unwrap();
    let panes = Panes::open(Terminal::new(TestBackend::new(120, 8)).unwrap()).unwrap();
    let mut dashboard = Dashboard::new(panes.header, panes.columns, panes.body, METRICS);
    let stop = StopFlag::new();

    // What Ctrl-C does: the handler sets the flag, and the signal reaches the
    // query's own process group only if someone targets it explicitly.
    let interrupt = async {
        let pid = loop {
            if let Some(pid) = fs::read_to_string(&pid_file)
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok())
            {
                break pid;
            }
            sleep(Duration::from_millis(20)).await;
        };
        stop.stop();
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("kill -INT -{pid}"))
            .status()
            .unwrap();
        assert!(status.success(), "query does not lead its own process group");
    };

    let (outcome, ()) = tokio::join!(
        poll_loop(&mut cluster, &mut dashboard, &stop, Duration::ZERO),
        interrupt
    );
    outcome.unwrap();
}
