//! Clients table: the column heading line and one row per client.

use tracing::debug;

use crate::metrics;
use crate::snapshot::{ClientRow, Snapshot, NOT_AVAILABLE};
use crate::ui::layout::{Column, ColumnKey, ColumnLayout};
use crate::ui::surface::{Emphasis, Surface};
use crate::ui::util::{clip, wrap};

pub fn draw_column_line<S: Surface>(line: &mut S, layout: &ColumnLayout) {
    line.write_at(0, 0, layout.visible_heading(), Emphasis::Standout);
}

pub fn draw_clients<S: Surface>(body: &mut S, layout: &ColumnLayout, snapshot: &Snapshot) {
    for (y, row) in snapshot.rows().enumerate() {
        let Ok(y) = u16::try_from(y) else { break };
        draw_client_row(body, layout, &snapshot.global_counters, &row, y);
    }
}

/// Cells left on the current row. Each column consumes its full width; once the
/// row is used up nothing further is drawn.
struct RowBudget(u16);

impl RowBudget {
    /// Returns the content width to draw with, and whether cells remain after it.
    fn take(&mut self, col: Column) -> (usize, bool) {
        let hlen = col.content_width().min(self.0);
        self.0 = self.0.saturating_sub(col.width);
        (usize::from(hlen), self.0 > 0)
    }
}

fn draw_client_row<S: Surface>(
    body: &mut S,
    layout: &ColumnLayout,
    counters: &[String],
    row: &ClientRow<'_>,
    y: u16,
) {
    let mut budget = RowBudget(layout.terminal_width.saturating_sub(1));
    let put = |body: &mut S, col: Column, hlen: usize, text: &str| {
        body.write_at(y, col.x, clip(text, hlen), Emphasis::Plain);
    };

    for key in [ColumnKey::Padding, ColumnKey::ClientId, ColumnKey::MountRoot] {
        let Some(col) = layout.get(key) else { continue };
        let (hlen, more) = budget.take(col);
        match key {
            ColumnKey::ClientId => {
                let id = row.id.split_once('.').map_or(row.id, |(_, rest)| rest);
                put(body, col, hlen, &wrap(id, hlen));
            }
            ColumnKey::MountRoot => match row.meta.mount_root.as_deref() {
                Some(root) => put(body, col, hlen, &wrap(root, hlen)),
                None => put(body, col, hlen, NOT_AVAILABLE),
            },
            _ => {}
        }
        if !more {
            return;
        }
    }

    for (name, pair) in counters.iter().zip(row.counters) {
        let Some(spec) = metrics::lookup(name) else {
            debug!(counter = %name, "skipping untracked counter");
            continue;
        };
        let Some(col) = layout.get(ColumnKey::Metric(spec.name)) else {
            continue;
        };
        let (hlen, more) = budget.take(col);
        if row.meta.supports(name) {
            put(body, col, hlen, &spec.kind.derive(*pair).to_string());
        } else {
            put(body, col, hlen, NOT_AVAILABLE);
        }
        if !more {
            return;
        }
    }

    // Last column: usually the longest string, so it gets whatever is left.
    if let Some(col) = layout.get(ColumnKey::MountPointHostAddr) {
        let remaining = usize::from(budget.0);
        let text = row
            .meta
            .mount_host_addr()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        put(body, col, remaining, &text);
    }
}
