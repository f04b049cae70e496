//! Entry point for fstop. Parses flags, sets up logging and runs the dashboard.

use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fstop::app::{install_signal_handlers, run, Mode, StopFlag};
use fstop::cli::Cli;
use fstop::cluster::CephCli;
use fstop::demo::DemoCluster;

const LOG_ENV: &str = "FSTOP_LOG";

/// The dashboard owns the terminal, so logs only go to stderr in self-test mode.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match (&cli.log_file, cli.mode()) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Arc::new(file)).init();
        }
        (None, Mode::SelfTest) => builder.with_writer(std::io::stderr).init(),
        (None, Mode::Display) => {}
    }
    Ok(())
}

async fn start(cli: Cli) -> anyhow::Result<()> {
    init_logging(&cli)?;
    let stop = StopFlag::new();
    install_signal_handlers(stop.clone());
    let mode = cli.mode();

    if cli.demo {
        info!("running against the demo cluster");
        run(&mut DemoCluster::new(), mode, &stop).await?;
    } else {
        let mut cluster = CephCli::connect(cli.ceph_options()).await?;
        run(&mut cluster, mode, &stop).await?;
    }

    if mode == Mode::SelfTest {
        println!("selftest ok");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fstop: {e:#}");
            ExitCode::FAILURE
        }
    }
}
