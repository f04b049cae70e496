//! Column geometry for the clients table.
//!
//! The heading and every body row share one map from column key to
//! `(x offset, width)`. It is built once at startup; resizing the terminal
//! does not relayout.

use crate::metrics::MetricSpec;

/// Separator between columns; each column reserves its width.
pub const ITEMS_PAD: &str = " ";

pub const COL_CLIENT_ID: &str = "CLIENT_ID";
pub const COL_MOUNT_ROOT: &str = "MOUNT_ROOT";
pub const COL_MOUNT_POINT_HOST_ADDR: &str = "MOUNT_POINT@HOST/ADDR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Padding,
    ClientId,
    MountRoot,
    /// Keyed by the bare metric name, not the decorated label.
    Metric(&'static str),
    MountPointHostAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub x: u16,
    /// Label width plus padding.
    pub width: u16,
}

impl Column {
    /// Cells available for content once the padding is reserved.
    pub fn content_width(&self) -> u16 {
        self.width.saturating_sub(ITEMS_PAD.len() as u16)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub heading: String,
    pub terminal_width: u16,
    columns: Vec<(ColumnKey, Column)>,
}

impl ColumnLayout {
    pub fn get(&self, key: ColumnKey) -> Option<Column> {
        self.columns
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
    }

    /// Columns in left-to-right order.
    pub fn columns(&self) -> &[(ColumnKey, Column)] {
        &self.columns
    }

    /// Heading clipped the way it is drawn: two cells short of the terminal edge.
    pub fn visible_heading(&self) -> &str {
        let max = usize::from(self.terminal_width.saturating_sub(2));
        super::util::clip(&self.heading, max)
    }
}

/// Walks the leading columns, one column per metric, then the trailing column,
/// giving each `len(label) + len(ITEMS_PAD)` cells.
pub fn build_layout(terminal_width: u16, metrics: &[MetricSpec]) -> ColumnLayout {
    let leading = [
        (ColumnKey::Padding, ITEMS_PAD.to_string()),
        (ColumnKey::ClientId, COL_CLIENT_ID.to_string()),
        (ColumnKey::MountRoot, COL_MOUNT_ROOT.to_string()),
    ];
    let metric_cols = metrics.iter().map(|m| (ColumnKey::Metric(m.name), m.heading()));
    let trailing = [(
        ColumnKey::MountPointHostAddr,
        COL_MOUNT_POINT_HOST_ADDR.to_string(),
    )];

    let mut x: u16 = 0;
    let mut labels = Vec::new();
    let mut columns = Vec::new();
    for (key, label) in leading.into_iter().chain(metric_cols).chain(trailing) {
        let width = (label.chars().count() + ITEMS_PAD.len()) as u16;
        columns.push((key, Column { x, width }));
        x = x.saturating_add(width);
        labels.push(label);
    }

    ColumnLayout {
        heading: labels.join(ITEMS_PAD),
        terminal_width,
        columns,
    }
}
