//! Schedule model shared by the parser, the calculator, and persistence.
//!
//! The JSON shape is the persisted wire format:
//! `{"type":"once","run_at":"..."}`, `{"type":"weekly","weekday":0,"time":"20:00"}`,
//! `{"type":"monthly","day":15,"time":"09:00"}`.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// When a reminder fires.
///
/// Weekday numbering is 0 = Monday .. 6 = Sunday. `time` fields hold a
/// 24-hour `HH:MM` string; [`parse_hhmm`] is the single place that
/// interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schedule {
    /// Fires exactly once at the embedded instant (ISO 8601 with offset)
    Once { run_at: String },
    /// Fires every week on `weekday` at `time`
    Weekly { weekday: u8, time: String },
    /// Fires every month on `day` at `time`, skipping months without it
    Monthly { day: u8, time: String },
}

impl Schedule {
    /// Whether this schedule produces more than one firing.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Schedule::Once { .. })
    }
}

/// Parse an `HH:MM` string into (hour, minute).
///
/// Returns `None` for anything that is not a valid 24-hour time.
pub fn parse_hhmm(time: &str) -> Option<(u32, u32)> {
    let (h, m) = time.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour >= 24 || minute >= 60 {
        return None;
    }
    Some((hour, minute))
}

/// Parse a persisted ISO 8601 instant into the configured zone.
pub fn parse_instant(s: &str, tz: Tz) -> Option<DateTime<Tz>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&tz))
}

/// Resolve a civil date + wall-clock time in the zone.
///
/// `None` when the time of day is invalid, or the local time does not
/// exist in the zone (DST gap) or is ambiguous.
pub fn resolve_civil(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Tz>> {
    date.and_hms_opt(hour, minute, 0)?
        .and_local_timezone(tz)
        .single()
}
