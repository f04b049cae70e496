//! Command line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::app::Mode;
use crate::cluster::CephOptions;

/// Live per-client CephFS performance dashboard.
#[derive(Debug, Parser)]
#[command(name = "fstop", version, about)]
pub struct Cli {
    /// Ceph cluster to connect to.
    #[arg(long, default_value = "ceph", value_name = "NAME")]
    pub cluster: String,

    /// Ceph user to connect as (without the `client.` prefix).
    #[arg(long, default_value = "fstop", value_name = "NAME")]
    pub id: String,

    /// Path to the cluster configuration file.
    #[arg(long, value_name = "PATH")]
    pub conffile: Option<PathBuf>,

    /// Query once, check the reply version and exit.
    #[arg(long)]
    pub selftest: bool,

    /// `ceph` command line tool used to talk to the cluster.
    #[arg(long, env = "FSTOP_CEPH_BIN", default_value = "ceph", value_name = "PATH")]
    pub ceph_bin: PathBuf,

    /// Show synthetic clients instead of connecting to a cluster.
    #[arg(long)]
    pub demo: bool,

    /// Write logs here while the dashboard is on screen.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.selftest {
            Mode::SelfTest
        } else {
            Mode::Display
        }
    }

    pub fn ceph_options(&self) -> CephOptions {
        CephOptions {
            ceph_bin: self.ceph_bin.clone(),
            cluster: self.cluster.clone(),
            id: self.id.clone(),
            conffile: self.conffile.clone(),
        }
    }
}
