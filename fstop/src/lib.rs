//! fstop: a top-like dashboard of per-client CephFS performance counters.
//!
//! Each second the `stats` mgr module is asked for `fs perf stats`; the reply is
//! decoded into a [`snapshot::Snapshot`] and drawn as one row per client.

pub mod app;
pub mod cli;
pub mod cluster;
pub mod demo;
pub mod error;
pub mod metrics;
pub mod snapshot;
pub mod types;
pub mod ui;
