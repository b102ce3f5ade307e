// Core layer - shared configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// LINE Messaging API layer - client, wire types, quick replies
pub mod line;

// Infrastructure - JSON file persistence
pub mod storage;

// Application layer - webhook server and conversation flow
pub mod webhook;

// Re-export core config for convenience
pub use crate::core::Config;

// Re-export feature items
pub use features::{
    // Parser
    parse, ParseResult,
    // Schedule
    advance, initial_run_at, Schedule,
    // Reminders
    Reminder, ReminderStatus,
    // Sessions
    SessionStore,
    // Sweep
    next_sleep_duration, sweep, Notifier, SweepOutcome,
};

// Re-export the LINE client
pub use line::LineClient;
pub use storage::Storage;
