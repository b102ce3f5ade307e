//! # Sessions Feature
//!
//! In-memory conversation state for interactive reminder registration
//! and deletion. Lost on restart.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

pub mod store;

pub use store::{Session, SessionState, SessionStore, MAX_FAIL_COUNT};
