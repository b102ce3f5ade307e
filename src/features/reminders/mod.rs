//! # Reminders Feature
//!
//! The persisted reminder record and its user-facing list rendering.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod display;
pub mod model;

pub use display::{format_deletion_list, format_reminder_list};
pub use model::{sorted_pending_for_user, Reminder, ReminderStatus};
