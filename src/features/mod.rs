//! # Features
//!
//! One directory per feature. Leaves first: schedule and parser are pure,
//! sweep consumes them, reminders and sessions carry the state they act on.

pub mod parser;
pub mod reminders;
pub mod schedule;
pub mod sessions;
pub mod sweep;

// Re-export the items callers actually use
pub use parser::{parse, ParseResult};
pub use reminders::{Reminder, ReminderStatus};
pub use schedule::{advance, initial_run_at, Schedule};
pub use sessions::SessionStore;
pub use sweep::{next_sleep_duration, sweep, Notifier, SweepOutcome};
