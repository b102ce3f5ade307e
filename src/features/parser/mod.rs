//! # Parser Feature
//!
//! Japanese natural-language time expression parsing.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Bare-date forms validate the calendar only (year rollover for
//!   year-less forms); past-instant checks stay on the date+time forms
//! - 1.1.0: 午前/午後 markers in the time-of-day sub-parser
//! - 1.0.0: Initial creation with the ordered recognizer chain

pub mod japanese;

pub use japanese::{parse, parse_time_of_day, weekday_number, ParseResult};
