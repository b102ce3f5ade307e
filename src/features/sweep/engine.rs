//! Due-reminder sweep.
//!
//! Each cycle receives the full reminder snapshot, fires what is due
//! through the injected [`Notifier`], advances recurring schedules from
//! their scheduled instant, and retires finished or hopelessly stale
//! entries. No reminder's failure stops the others.

use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use log::{error, warn};

use crate::features::reminders::{Reminder, ReminderStatus};
use crate::features::schedule::{advance, parse_instant, Schedule};

/// Staleness bound in seconds. A due reminder older than this is archived
/// without notification instead of firing arbitrarily late.
pub const EXECUTION_GRACE_PERIOD_SECS: i64 = 60;

/// Push-style notification sink. Returns `true` on delivery; `false`
/// leaves the reminder pending for the next cycle.
#[async_trait]
pub trait Notifier {
    async fn notify(&self, user_id: &str, text: &str) -> bool;
}

/// Result of one sweep: the surviving active collection and the entries
/// to move to the archive.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub updated: Vec<Reminder>,
    pub retired: Vec<Reminder>,
}

/// Process all due reminders in `reminders` against `now`.
///
/// At most one notification is attempted per due, non-stale reminder;
/// stale ones are retired silently. Reminders that are not pending, or
/// whose `next_run_at` is missing or unreadable, pass through unchanged.
pub async fn sweep<N>(reminders: Vec<Reminder>, now: DateTime<Tz>, notifier: &N) -> SweepOutcome
where
    N: Notifier + ?Sized,
{
    let tz = now.timezone();
    let mut outcome = SweepOutcome::default();

    for mut reminder in reminders {
        if reminder.status != ReminderStatus::Pending {
            outcome.updated.push(reminder);
            continue;
        }

        let Some(next_run_str) = reminder.next_run_at.clone() else {
            outcome.updated.push(reminder);
            continue;
        };

        let Some(next_run) = parse_instant(&next_run_str, tz) else {
            error!(
                "Invalid next_run_at '{next_run_str}' for reminder {}",
                reminder.id
            );
            outcome.updated.push(reminder);
            continue;
        };

        if next_run > now {
            outcome.updated.push(reminder);
            continue;
        }

        let staleness = (now - next_run).num_seconds();
        if staleness > EXECUTION_GRACE_PERIOD_SECS {
            warn!(
                "Reminder {} is {staleness}s overdue, archiving without execution",
                reminder.id
            );
            reminder.status = ReminderStatus::Done;
            outcome.retired.push(reminder);
            continue;
        }

        let message = format!("🔔 リマインダー\n{}", reminder.text);
        if !notifier.notify(&reminder.user_id, &message).await {
            // Delivery failed: keep for retry on the next cycle
            outcome.updated.push(reminder);
            continue;
        }

        if let Schedule::Once { .. } = reminder.schedule {
            reminder.status = ReminderStatus::Done;
            outcome.retired.push(reminder);
            continue;
        }

        match advance(&reminder.schedule, next_run) {
            Some(next) => {
                reminder.next_run_at = Some(next.to_rfc3339());
                outcome.updated.push(reminder);
            }
            None => {
                warn!("Couldn't calculate next run for reminder {}", reminder.id);
                reminder.status = ReminderStatus::Done;
                outcome.retired.push(reminder);
            }
        }
    }

    outcome
}
