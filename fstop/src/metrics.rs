//! Tracked per-client metrics and the derivations that turn a raw counter pair into a display value.

use std::fmt;

/// Raw `(a, b)` pair reported per counter, e.g. hits/misses or seconds/nanoseconds.
pub type CounterPair = (u64, u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    None,
    Percentage,
    Latency,
}

impl MetricKind {
    /// Header suffix appended to the column label.
    pub fn suffix(self) -> &'static str {
        match self {
            MetricKind::Percentage => "(%)",
            MetricKind::Latency => "(s)",
            MetricKind::None => "",
        }
    }

    pub fn derive(self, pair: CounterPair) -> MetricValue {
        match self {
            MetricKind::Percentage => MetricValue::Decimal(percentage(pair)),
            MetricKind::Latency => MetricValue::Decimal(latency(pair)),
            MetricKind::None => MetricValue::Count(pair.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    /// Upper-case counter name, also the layout key.
    pub name: &'static str,
    /// Short column label shown in the heading.
    pub label: &'static str,
    pub kind: MetricKind,
}

impl MetricSpec {
    const fn new(name: &'static str, label: &'static str, kind: MetricKind) -> Self {
        Self { name, label, kind }
    }

    /// Decorated heading label, e.g. `chit(%)`.
    pub fn heading(&self) -> String {
        format!("{}{}", self.label, self.kind.suffix())
    }
}

/// Metrics in the order the stats module emits them. Extend at the end when the
/// stats version adds counters.
pub const METRICS: &[MetricSpec] = &[
    MetricSpec::new("CAP_HIT", "chit", MetricKind::Percentage),
    MetricSpec::new("READ_LATENCY", "rlat", MetricKind::Latency),
    MetricSpec::new("WRITE_LATENCY", "wlat", MetricKind::Latency),
    MetricSpec::new("METADATA_LATENCY", "mlat", MetricKind::Latency),
    MetricSpec::new("DENTRY_LEASE", "dlease", MetricKind::Percentage),
    MetricSpec::new("OPENED_FILES", "ofiles", MetricKind::None),
    MetricSpec::new("PINNED_ICAPS", "oicaps", MetricKind::None),
    MetricSpec::new("OPENED_INODES", "oinodes", MetricKind::None),
];

/// Finds a tracked metric by counter name, ignoring case (`cap_hit` == `CAP_HIT`).
pub fn lookup(counter: &str) -> Option<&'static MetricSpec> {
    METRICS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(counter))
}

/// hits / (hits + misses) as a percentage; both zero yields 0.0.
pub fn percentage((hits, misses): CounterPair) -> f64 {
    if hits == 0 && misses == 0 {
        return 0.0;
    }
    let hits = hits as f64;
    round2(hits / (hits + misses as f64) * 100.0)
}

/// Seconds plus a nanosecond remainder. The remainder is not carried: values
/// >= 1e9 are taken as reported.
pub fn latency((secs, nsecs): CounterPair) -> f64 {
    round2(secs as f64 + nsecs as f64 / 1_000_000_000.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Decimal(f64),
    Count(u64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // whole numbers keep one decimal place: 75.0, not 75
            MetricValue::Decimal(v) if v.fract() == 0.0 => write!(f, "{v:.1}"),
            MetricValue::Decimal(v) => write!(f, "{v}"),
            MetricValue::Count(n) => write!(f, "{n}"),
        }
    }
}
