// ── Panel clock ──
//
// The panel never reports its time directly. The keypad display line reads
// "Dow DD Mon HH:MM" (no year, panel-local), which is parsed with the
// current UTC year and treated as UTC. Zone trip timestamps are compared
// against this clock, not the host's wall clock, so drift between the two
// does not make zones flap.
//
// While the display rolls over (or shows a message instead of the time) the
// parse fails; the last good offset against wall-clock time is reapplied.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Utc, Weekday};
use tracing::debug;

/// A parse more than this far from wall-clock time is assumed to straddle
/// a new year and is moved by one year.
const YEAR_WRAP_THRESHOLD: TimeDelta = TimeDelta::days(183);

/// Parse the keypad display as a UTC timestamp in the current year of `now`.
///
/// The weekday token must name a weekday but is not checked against the
/// date: the panel's calendar is authoritative.
pub fn parse_panel_display(display: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let display = display.trim();
    let (dow, rest) = display.split_once(char::is_whitespace)?;
    dow.parse::<Weekday>().ok()?;

    let candidate = format!("{} {}", now.year(), rest.trim());
    let parsed = NaiveDateTime::parse_from_str(&candidate, "%Y %d %b %H:%M")
        .ok()?
        .and_utc();

    let delta = parsed - now;
    if delta > YEAR_WRAP_THRESHOLD {
        parsed.with_year(now.year() - 1)
    } else if delta < -YEAR_WRAP_THRESHOLD {
        parsed.with_year(now.year() + 1)
    } else {
        Some(parsed)
    }
}

/// Sliding panel-vs-wall-clock offset.
///
/// Owned by the alarm coordinator; fed every display payload it fetches.
#[derive(Debug, Clone, Default)]
pub struct PanelClock {
    offset: Option<TimeDelta>,
}

impl PanelClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive panel time from a fresh display string.
    ///
    /// On success the offset is recorded; on failure `now` plus the last
    /// recorded offset (or zero) is returned and the offset is kept.
    pub fn observe(&mut self, text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(panel_time) = parse_panel_display(text, now) {
            self.offset = Some(panel_time - now);
            return panel_time;
        }

        debug!(
            display = %text,
            offset_secs = self.offset.map(|o| o.num_seconds()),
            "panel display is not a clock, reusing last offset"
        );
        now + self.offset.unwrap_or_default()
    }

    /// Panel time at `now` using the last known offset.
    pub fn at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.offset.unwrap_or_default()
    }

    /// The last successfully derived offset, if any.
    pub fn offset(&self) -> Option<TimeDelta> {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("valid date")
    }

    #[test]
    fn parses_display_in_current_year() {
        let now = utc(2025, 5, 12, 20, 55, 30);
        assert_eq!(
            parse_panel_display("Mon 12 May 20:55", now),
            Some(utc(2025, 5, 12, 20, 55, 0))
        );
    }

    #[test]
    fn weekday_is_not_cross_checked() {
        // 12 May 2026 is a Tuesday; the panel's word stands.
        let now = utc(2026, 5, 12, 20, 55, 0);
        assert_eq!(
            parse_panel_display("Mon 12 May 20:55", now),
            Some(utc(2026, 5, 12, 20, 55, 0))
        );
    }

    #[test]
    fn rejects_non_clock_text() {
        let now = utc(2025, 5, 12, 20, 55, 0);
        assert_eq!(parse_panel_display("SYSTEM SET", now), None);
        assert_eq!(parse_panel_display("Xyz 12 May 20:55", now), None);
        assert_eq!(parse_panel_display("Mon 32 May 20:55", now), None);
        assert_eq!(parse_panel_display("", now), None);
    }

    #[test]
    fn new_year_rollover_uses_previous_year() {
        // Host already in January, panel still shows 31 December.
        let now = utc(2026, 1, 1, 0, 0, 20);
        assert_eq!(
            parse_panel_display("Wed 31 Dec 23:59", now),
            Some(utc(2025, 12, 31, 23, 59, 0))
        );
    }

    #[test]
    fn new_year_rollover_uses_next_year() {
        // Panel ahead of host across the boundary.
        let now = utc(2025, 12, 31, 23, 59, 50);
        assert_eq!(
            parse_panel_display("Thu 01 Jan 00:00", now),
            Some(utc(2026, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn failed_parse_reapplies_last_offset() {
        let mut clock = PanelClock::new();
        let now = utc(2025, 5, 12, 20, 55, 30);

        // Panel runs two minutes ahead of the host.
        let panel = clock.observe("Mon 12 May 20:57", now);
        assert_eq!(panel, utc(2025, 5, 12, 20, 57, 0));
        assert_eq!(clock.offset(), Some(TimeDelta::seconds(90)));

        let later = now + TimeDelta::seconds(60);
        assert_eq!(clock.observe("  ", later), later + TimeDelta::seconds(90));
        assert_eq!(clock.offset(), Some(TimeDelta::seconds(90)));
    }

    #[test]
    fn failed_parse_without_history_is_wall_clock() {
        let mut clock = PanelClock::new();
        let now = utc(2025, 5, 12, 20, 55, 30);
        assert_eq!(clock.observe("SERVICE REQUIRED", now), now);
        assert_eq!(clock.offset(), None);
    }
}
