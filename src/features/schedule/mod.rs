//! # Schedule Feature
//!
//! Schedule model and next-run calculation for one-off and recurring
//! reminders.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Monthly advance scans month-by-month until the day exists
//! - 1.0.0: Initial creation with once/weekly/monthly schedules

pub mod calculator;
pub mod model;

pub use calculator::{advance, initial_run_at};
pub use model::{parse_hhmm, parse_instant, Schedule};
