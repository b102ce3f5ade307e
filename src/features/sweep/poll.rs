//! Adaptive sleep calculation for the scheduler loop.
//!
//! The loop polls at a fixed 30s ceiling while nothing is imminent, and
//! shortens the sleep to wake exactly when the nearest reminder is due.

use chrono::DateTime;
use chrono_tz::Tz;
use std::time::Duration;

use crate::features::reminders::{Reminder, ReminderStatus};
use crate::features::schedule::parse_instant;

/// Ceiling on the sweep interval when nothing is due soon
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Floor on the sleep so an already-due reminder is rechecked promptly
/// without spinning
const MIN_SLEEP: Duration = Duration::from_millis(500);

/// Earliest `next_run_at` among pending reminders, if any.
pub fn next_reminder_time(reminders: &[Reminder], tz: Tz) -> Option<DateTime<Tz>> {
    reminders
        .iter()
        .filter(|r| r.status == ReminderStatus::Pending)
        .filter_map(|r| r.next_run_at.as_deref())
        .filter_map(|s| parse_instant(s, tz))
        .min()
}

/// How long the scheduler loop should sleep before the next sweep.
///
/// - nothing pending, or the nearest reminder is 30s+ away: 30s
/// - the nearest reminder already passed: 500ms
/// - otherwise: the remaining time, floored at 500ms
pub fn next_sleep_duration(reminders: &[Reminder], now: DateTime<Tz>) -> Duration {
    let Some(next) = next_reminder_time(reminders, now.timezone()) else {
        return DEFAULT_POLL_INTERVAL;
    };

    let remaining = next - now;
    if remaining <= chrono::Duration::zero() {
        return MIN_SLEEP;
    }
    if remaining >= chrono::Duration::seconds(30) {
        return DEFAULT_POLL_INTERVAL;
    }
    remaining.to_std().map_or(MIN_SLEEP, |d| d.max(MIN_SLEEP))
}
