//! User-facing reminder list rendering.
//!
//! Plain-text lists for the LINE reply flow. Entry numbering follows the
//! order of the slice passed in, which must be the same order stored in
//! the deletion session.

use chrono_tz::Tz;

use crate::features::reminders::model::Reminder;
use crate::features::schedule::{parse_instant, Schedule};

/// Format a user's pending reminders for the 「リマインド一覧」 reply.
pub fn format_reminder_list(reminders: &[Reminder], tz: Tz) -> String {
    if reminders.is_empty() {
        return "📋 登録されているリマインダーはありません。".to_string();
    }

    let mut lines = vec!["📋 リマインダー一覧\n".to_string()];
    for (i, reminder) in reminders.iter().enumerate() {
        lines.push(format!(
            "{}. {} {}",
            i + 1,
            type_indicator(&reminder.schedule),
            short_time(reminder, tz)
        ));
        lines.push(format!("   {}\n", reminder.text));
    }

    lines.join("\n")
}

/// Format the numbered deletion menu for the 「リマインド削除」 reply.
pub fn format_deletion_list(reminders: &[Reminder], tz: Tz) -> String {
    let mut lines = vec!["🗑 削除するリマインダーの番号を送信してください。\n".to_string()];
    for (i, reminder) in reminders.iter().enumerate() {
        lines.push(format!(
            "{}. {} {}",
            i + 1,
            type_indicator(&reminder.schedule),
            short_time(reminder, tz)
        ));
        lines.push(format!("   {}\n", reminder.text));
    }

    lines.join("\n")
}

fn type_indicator(schedule: &Schedule) -> &'static str {
    match schedule {
        Schedule::Weekly { .. } => "🔁 毎週",
        Schedule::Monthly { .. } => "🔁 毎月",
        Schedule::Once { .. } => "📅",
    }
}

fn short_time(reminder: &Reminder, tz: Tz) -> String {
    reminder
        .next_run_at
        .as_deref()
        .and_then(|s| parse_instant(s, tz))
        .map(|t| t.format("%m/%d %H:%M").to_string())
        .unwrap_or_else(|| "不明".to_string())
}
