//! # Sweep Feature
//!
//! Due-reminder processing: fire, advance, retire. One sweep is a single
//! pass over a full snapshot of the reminder collection.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Adaptive sleep calculation split into its own module
//! - 1.0.0: Initial creation with the grace-period policy

pub mod engine;
pub mod poll;

pub use engine::{sweep, Notifier, SweepOutcome, EXECUTION_GRACE_PERIOD_SECS};
pub use poll::{next_reminder_time, next_sleep_duration, DEFAULT_POLL_INTERVAL};
