//! Poll loop: query the cluster, decode, render, sleep, until a signal asks us to stop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cluster::{verify_perf_stats_support, Cluster};
use crate::error::{DecodeError, FsTopError, Result, SUPPORTED_VERSION};
use crate::metrics::METRICS;
use crate::snapshot::decode;
use crate::ui::dashboard::Dashboard;
use crate::ui::surface::{Panes, Surface};

/// Time between two snapshots.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Set once a stop is requested; checked between cycles only.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Flips `stop` on SIGINT or SIGTERM. Must be called from inside the runtime.
pub fn install_signal_handlers(stop: StopFlag) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut term = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "cannot watch SIGTERM");
                    let _ = tokio::signal::ctrl_c().await;
                    stop.stop();
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
                _ = term.recv() => info!("received SIGTERM"),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl-C");
        }
        stop.stop();
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Display,
    SelfTest,
}

/// Runs one session against `cluster`, then shuts the cluster down whatever the outcome.
pub async fn run<C: Cluster>(cluster: &mut C, mode: Mode, stop: &StopFlag) -> Result<()> {
    let outcome = session(cluster, mode, stop).await;
    cluster.shutdown().await;
    outcome
}

async fn session<C: Cluster>(cluster: &mut C, mode: Mode, stop: &StopFlag) -> Result<()> {
    verify_perf_stats_support(cluster).await?;
    match mode {
        Mode::SelfTest => selftest(cluster).await,
        Mode::Display => {
            let _guard = TerminalGuard::enter(stop)?;
            let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
            let panes = Panes::open(terminal)?;
            let mut dashboard = Dashboard::new(panes.header, panes.columns, panes.body, METRICS);
            poll_loop(cluster, &mut dashboard, stop, POLL_INTERVAL).await
        }
    }
}

/// One query; the reply must carry the supported version.
pub async fn selftest<C: Cluster>(cluster: &mut C) -> Result<()> {
    let raw = cluster.perf_stats().await?;
    match raw.get("version").and_then(|v| v.as_i64()) {
        Some(SUPPORTED_VERSION) => Ok(()),
        Some(found) => Err(DecodeError::VersionMismatch { found }.into()),
        None => Err(DecodeError::Malformed("missing 'version'".into()).into()),
    }
}

/// Draws the column line once, then refreshes header and body every `interval`
/// until `stop` is set. A version mismatch is shown and polling continues; any
/// other error ends the loop, unless it arrives after a stop was requested.
pub async fn poll_loop<C: Cluster, S: Surface>(
    cluster: &mut C,
    dashboard: &mut Dashboard<S>,
    stop: &StopFlag,
    interval: Duration,
) -> Result<()> {
    dashboard.draw_column_line()?;
    let mut cycles: u64 = 0;
    while !stop.is_stopped() {
        let raw = match cluster.perf_stats().await {
            Ok(raw) => raw,
            Err(e) if stop.is_stopped() => {
                info!(error = %e, "query cut short by stop request");
                break;
            }
            Err(e) => return Err(e),
        };
        let decoded = decode(&raw);
        let snapshot = match &decoded {
            Ok(s) => Some(s),
            Err(DecodeError::VersionMismatch { found }) => {
                warn!(found, expected = SUPPORTED_VERSION, "perf stats version mismatch");
                None
            }
            Err(e @ DecodeError::Malformed(_)) => return Err(FsTopError::Decode(e.clone())),
        };
        dashboard.render_frame(snapshot, &Local::now())?;
        cycles += 1;
        debug!(
            cycle = cycles,
            clients = snapshot.map_or(0, |s| s.global_metrics.len()),
            "frame"
        );

        if stop.is_stopped() {
            break;
        }
        sleep(interval).await;
    }
    info!(cycles, "poll loop stopped");
    Ok(())
}

/// How long the key watcher blocks on input before rechecking whether to exit.
const KEY_POLL: Duration = Duration::from_millis(100);

/// `q`, `Esc` and Ctrl-C end the dashboard. Raw mode turns Ctrl-C into a key
/// event, so it has to be handled here rather than as SIGINT.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Reads terminal input on its own thread so keystrokes never reach the screen,
/// and turns quit keys into a stop request.
struct KeyWatcher {
    done: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl KeyWatcher {
    fn spawn(stop: StopFlag) -> Self {
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::SeqCst) && !stop.is_stopped() {
                match event::poll(KEY_POLL) {
                    Ok(false) => {}
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) if is_quit_key(&key) => {
                            info!(key = ?key.code, "quit key pressed");
                            stop.stop();
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "terminal input closed");
                            return;
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "terminal input closed");
                        return;
                    }
                }
            }
        });
        Self {
            done,
            handle: Some(handle),
        }
    }
}

impl Drop for KeyWatcher {
    fn drop(&mut self) {
        self.done.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Raw mode, alternate screen and the key watcher for the lifetime of the
/// dashboard; all restored on drop, including on error.
struct TerminalGuard {
    keys: Option<KeyWatcher>,
}

impl TerminalGuard {
    fn enter(stop: &StopFlag) -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self {
            keys: Some(KeyWatcher::spawn(stop.clone())),
        })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        drop(self.keys.take());
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
    }
}
