//! Drawable screen regions.
//!
//! The renderer only needs to place text, clear a region and push it to the
//! terminal. [`Pane`] implements that over a ratatui buffer per region: writes
//! land in the region's own buffer, and `refresh` copies it into a shared
//! shadow frame which `Terminal::draw` diffs against what is on screen.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::Terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Plain,
    Bold,
    /// Reverse video and bold, used for title lines.
    Standout,
}

impl From<Emphasis> for Style {
    fn from(e: Emphasis) -> Self {
        match e {
            Emphasis::Plain => Style::default(),
            Emphasis::Bold => Style::default().add_modifier(Modifier::BOLD),
            Emphasis::Standout => {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            }
        }
    }
}

pub trait Surface {
    /// Width in cells; text past it is dropped.
    fn width(&self) -> u16;
    fn write_at(&mut self, row: u16, col: u16, text: &str, emphasis: Emphasis);
    fn clear(&mut self);
    fn refresh(&mut self) -> io::Result<()>;
}

/// Terminal plus the frame last pushed to it by any pane.
pub struct Screen<B: Backend> {
    terminal: Terminal<B>,
    shadow: Buffer,
}

impl<B: Backend> Screen<B> {
    pub fn new(mut terminal: Terminal<B>) -> io::Result<Self> {
        terminal.clear()?;
        terminal.hide_cursor()?;
        let size = terminal.size()?;
        Ok(Self {
            terminal,
            shadow: Buffer::empty(Rect::new(0, 0, size.width, size.height)),
        })
    }

    pub fn area(&self) -> Rect {
        self.shadow.area
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn present(&mut self, region: &Buffer) -> io::Result<()> {
        let area = region.area.intersection(self.shadow.area);
        for pos in area.positions() {
            if let (Some(src), Some(dst)) = (region.cell(pos), self.shadow.cell_mut(pos)) {
                *dst = src.clone();
            }
        }
        let shadow = &self.shadow;
        self.terminal.draw(|frame| {
            let visible = frame.area().intersection(shadow.area);
            let buf = frame.buffer_mut();
            for pos in visible.positions() {
                if let (Some(src), Some(dst)) = (shadow.cell(pos), buf.cell_mut(pos)) {
                    *dst = src.clone();
                }
            }
        })?;
        Ok(())
    }
}

/// One rectangular region of a shared [`Screen`].
pub struct Pane<B: Backend> {
    screen: Rc<RefCell<Screen<B>>>,
    buf: Buffer,
}

impl<B: Backend> Pane<B> {
    pub fn new(screen: Rc<RefCell<Screen<B>>>, area: Rect) -> Self {
        let area = area.intersection(screen.borrow().area());
        Self {
            screen,
            buf: Buffer::empty(area),
        }
    }

    pub fn area(&self) -> Rect {
        self.buf.area
    }

    /// The screen this pane draws on, shared with its siblings.
    pub fn screen(&self) -> Rc<RefCell<Screen<B>>> {
        Rc::clone(&self.screen)
    }
}

impl<B: Backend> Surface for Pane<B> {
    fn width(&self) -> u16 {
        self.buf.area.width
    }

    fn write_at(&mut self, row: u16, col: u16, text: &str, emphasis: Emphasis) {
        let area = self.buf.area;
        if row >= area.height || col >= area.width {
            return;
        }
        let room = usize::from(area.width - col);
        self.buf
            .set_stringn(area.x + col, area.y + row, text, room, emphasis);
    }

    fn clear(&mut self) {
        self.buf.reset();
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.screen.borrow_mut().present(&self.buf)
    }
}

/// The three regions of the dashboard, stacked top to bottom.
pub struct Panes<B: Backend> {
    pub header: Pane<B>,
    pub columns: Pane<B>,
    pub body: Pane<B>,
}

/// Rows taken by the header region; one blank row separates it from the column line.
pub const HEADER_HEIGHT: u16 = 2;
const COLUMN_LINE_Y: u16 = HEADER_HEIGHT + 1;
const BODY_Y: u16 = COLUMN_LINE_Y + 1;

impl<B: Backend> Panes<B> {
    pub fn open(terminal: Terminal<B>) -> io::Result<Self> {
        let screen = Rc::new(RefCell::new(Screen::new(terminal)?));
        let full = screen.borrow().area();
        let strip = |y: u16, height: u16| Rect::new(0, y, full.width, height);
        Ok(Self {
            header: Pane::new(screen.clone(), strip(0, HEADER_HEIGHT)),
            columns: Pane::new(screen.clone(), strip(COLUMN_LINE_Y, 1)),
            body: Pane::new(
                screen,
                strip(BODY_Y, full.height.saturating_sub(BODY_Y)),
            ),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Fake surface: a character grid plus a log of refreshes.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordingSurface {
        pub width: u16,
        pub rows: Vec<String>,
        pub emphasis: Vec<(u16, u16, Emphasis)>,
        pub clears: usize,
        pub refreshes: usize,
    }

    impl RecordingSurface {
        pub fn new(width: u16) -> Self {
            Self {
                width,
                rows: Vec::new(),
                emphasis: Vec::new(),
                clears: 0,
                refreshes: 0,
            }
        }

        pub fn line(&self, row: usize) -> &str {
            self.rows.get(row).map(|s| s.trim_end()).unwrap_or("")
        }
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> u16 {
            self.width
        }

        fn write_at(&mut self, row: u16, col: u16, text: &str, emphasis: Emphasis) {
            let (row, col) = (usize::from(row), usize::from(col));
            let width = usize::from(self.width);
            if col >= width {
                return;
            }
            if self.rows.len() <= row {
                self.rows.resize(row + 1, String::new());
            }
            let mut cells: Vec<char> = self.rows[row].chars().collect();
            if cells.len() < width {
                cells.resize(width, ' ');
            }
            for (i, ch) in text.chars().take(width - col).enumerate() {
                cells[col + i] = ch;
            }
            self.rows[row] = cells.into_iter().collect();
            if emphasis != Emphasis::Plain {
                self.emphasis.push((row as u16, col as u16, emphasis));
            }
        }

        fn clear(&mut self) {
            self.rows.clear();
            self.emphasis.clear();
            self.clears += 1;
        }

        fn refresh(&mut self) -> io::Result<()> {
            self.refreshes += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn panes_split_the_screen() {
        let panes = Panes::open(Terminal::new(TestBackend::new(40, 10)).unwrap()).unwrap();
        assert_eq!(panes.header.area(), Rect::new(0, 0, 40, 2));
        assert_eq!(panes.columns.area(), Rect::new(0, 3, 40, 1));
        assert_eq!(panes.body.area(), Rect::new(0, 4, 40, 6));
    }

    #[test]
    fn refresh_pushes_only_the_pane_region() {
        let mut panes = Panes::open(Terminal::new(TestBackend::new(20, 6)).unwrap()).unwrap();
        panes.header.write_at(0, 0, "title", Emphasis::Standout);
        panes.body.write_at(0, 2, "row one", Emphasis::Plain);
        panes.header.refresh().unwrap();

        let screen = panes.header.screen.borrow();
        let buf = screen.terminal().backend().buffer();
        assert_eq!(line(buf, 0), "title");
        assert!(buf[(0, 0)].modifier.contains(Modifier::REVERSED));
        assert_eq!(line(buf, 4), "", "body was not refreshed yet");
        drop(screen);

        panes.body.refresh().unwrap();
        let screen = panes.body.screen.borrow();
        let buf = screen.terminal().backend().buffer();
        assert_eq!(line(buf, 0), "title");
        assert_eq!(line(buf, 4), "  row one");
    }

    #[test]
    fn clear_then_refresh_erases_stale_rows() {
        let mut panes = Panes::open(Terminal::new(TestBackend::new(20, 8)).unwrap()).unwrap();
        panes.body.write_at(0, 0, "client a", Emphasis::Plain);
        panes.body.write_at(1, 0, "client b", Emphasis::Plain);
        panes.body.refresh().unwrap();

        panes.body.clear();
        panes.body.write_at(0, 0, "client a", Emphasis::Plain);
        panes.body.refresh().unwrap();

        let screen = panes.body.screen.borrow();
        let buf = screen.terminal().backend().buffer();
        assert_eq!(line(buf, 4), "client a");
        assert_eq!(line(buf, 5), "");
    }

    #[test]
    fn writes_past_the_edge_are_clipped() {
        let mut panes = Panes::open(Terminal::new(TestBackend::new(8, 6)).unwrap()).unwrap();
        panes.columns.write_at(0, 5, "overflowing", Emphasis::Bold);
        panes.columns.write_at(0, 9, "gone", Emphasis::Plain);
        panes.columns.write_at(3, 0, "no such row", Emphasis::Plain);
        panes.columns.refresh().unwrap();
        let screen = panes.columns.screen.borrow();
        assert_eq!(line(screen.terminal().backend().buffer(), 3), "     ove");
    }
}
