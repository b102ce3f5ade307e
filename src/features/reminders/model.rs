//! The persisted reminder record.
//!
//! Storage owns the collection; the sweep mutates only `next_run_at` and
//! `status`. The JSON field names are the persisted format.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::schedule::{initial_run_at, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Done,
}

/// A registered reminder: message + schedule + mutable next-fire instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub schedule: Schedule,
    /// ISO 8601 instant of the next firing; `None` once unresolvable
    pub next_run_at: Option<String>,
    pub created_at: String,
    pub status: ReminderStatus,
    /// Stamped when the reminder is appended to the archive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

impl Reminder {
    /// Build a complete pending reminder, resolving the schedule to its
    /// first execution instant.
    pub fn new(user_id: &str, text: &str, schedule: Schedule, now: DateTime<Tz>) -> Self {
        let next_run_at = initial_run_at(&schedule, now).map(|t| t.to_rfc3339());

        Reminder {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            schedule,
            next_run_at,
            created_at: now.to_rfc3339(),
            status: ReminderStatus::Pending,
            archived_at: None,
        }
    }
}

/// A user's pending reminders, sorted by next firing. The order doubles as
/// the numbering shown in the list and deletion replies.
pub fn sorted_pending_for_user(reminders: &[Reminder], user_id: &str) -> Vec<Reminder> {
    let mut mine: Vec<Reminder> = reminders
        .iter()
        .filter(|r| r.user_id == user_id && r.status == ReminderStatus::Pending)
        .cloned()
        .collect();
    mine.sort_by(|a, b| a.next_run_at.cmp(&b.next_run_at));
    mine
}
