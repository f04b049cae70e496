//! Ties the three regions to a column layout and draws whole frames.

use std::io;

use chrono::{DateTime, TimeZone};

use crate::metrics::MetricSpec;
use crate::snapshot::Snapshot;
use crate::ui::clients::{draw_clients, draw_column_line};
use crate::ui::header::draw_header;
use crate::ui::layout::{build_layout, ColumnLayout};
use crate::ui::surface::Surface;

pub struct Dashboard<S: Surface> {
    header: S,
    columns: S,
    body: S,
    layout: ColumnLayout,
}

impl<S: Surface> Dashboard<S> {
    /// Builds the column layout from the body width; it is not recomputed later.
    pub fn new(header: S, columns: S, body: S, metrics: &[MetricSpec]) -> Self {
        let layout = build_layout(body.width(), metrics);
        Self {
            header,
            columns,
            body,
            layout,
        }
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Drawn once at startup.
    pub fn draw_column_line(&mut self) -> io::Result<()> {
        self.columns.clear();
        draw_column_line(&mut self.columns, &self.layout);
        self.columns.refresh()
    }

    /// Clears and redraws the header and body. `None` means the reply failed the
    /// version check: the header shows a warning and the table is left empty.
    pub fn render_frame<Tz: TimeZone>(
        &mut self,
        snapshot: Option<&Snapshot>,
        now: &DateTime<Tz>,
    ) -> io::Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.header.clear();
        self.body.clear();
        let summary = snapshot.map(Snapshot::summary);
        draw_header(&mut self.header, summary.as_ref(), now);
        if let Some(s) = snapshot {
            draw_clients(&mut self.body, &self.layout, s);
        }
        self.header.refresh()?;
        self.body.refresh()
    }
}
