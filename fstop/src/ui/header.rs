//! Top header: program name with the current time, then the client summary.

use chrono::{DateTime, TimeZone};

use crate::snapshot::ClientSummary;
use crate::ui::surface::{Emphasis, Surface};

pub const PROG_NAME: &str = "fstop";
pub const VERSION_MISMATCH: &str = "perf stats version mismatch!";

/// `fstop - Sun Oct 18 23:12:05 2026`
pub fn title_line<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{PROG_NAME} - {}", now.format("%a %b %e %H:%M:%S %Y"))
}

pub fn summary_line(s: &ClientSummary) -> String {
    format!(
        "Client(s): {} - {} FUSE, {} kclient, {} libcephfs",
        s.clients, s.fuse, s.kernel, s.libs
    )
}

pub fn draw_header<S: Surface, Tz: TimeZone>(
    header: &mut S,
    summary: Option<&ClientSummary>,
    now: &DateTime<Tz>,
) where
    Tz::Offset: std::fmt::Display,
{
    match summary {
        Some(s) => {
            header.write_at(0, 0, &title_line(now), Emphasis::Standout);
            header.write_at(1, 0, &summary_line(s), Emphasis::Plain);
        }
        None => header.write_at(0, 0, VERSION_MISMATCH, Emphasis::Bold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::testing::RecordingSurface;
    use chrono::Utc;

    #[test]
    fn title_uses_ctime_format() {
        let now = Utc.with_ymd_and_hms(2026, 10, 8, 9, 5, 1).unwrap();
        assert_eq!(title_line(&now), "fstop - Thu Oct  8 09:05:01 2026");
    }

    #[test]
    fn header_shows_counts() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 23, 0, 0).unwrap();
        let mut s = RecordingSurface::new(80);
        let summary = ClientSummary {
            clients: 4,
            fuse: 2,
            kernel: 1,
            libs: 1,
        };
        draw_header(&mut s, Some(&summary), &now);
        assert_eq!(s.line(0), "fstop - Sun Oct 18 23:00:00 2026");
        assert_eq!(s.line(1), "Client(s): 4 - 2 FUSE, 1 kclient, 1 libcephfs");
        assert_eq!(s.emphasis, [(0, 0, Emphasis::Standout)]);
    }

    #[test]
    fn mismatch_replaces_the_title() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 23, 0, 0).unwrap();
        let mut s = RecordingSurface::new(80);
        draw_header(&mut s, None, &now);
        assert_eq!(s.line(0), VERSION_MISMATCH);
        assert_eq!(s.line(1), "");
        assert_eq!(s.emphasis, [(0, 0, Emphasis::Bold)]);
    }
}
