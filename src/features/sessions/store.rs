//! Per-user conversation sessions.
//!
//! Keyed by LINE user ID. Each session tracks which input the bot is
//! waiting for and how many times the user failed to provide it.

use dashmap::DashMap;

use crate::features::reminders::Reminder;

/// Failed attempts allowed before the flow is aborted
pub const MAX_FAIL_COUNT: u32 = 5;

/// What the bot is currently waiting for from a user.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// A reminder message was received; waiting for the time expression
    WaitingForTime { message: String },
    /// A deletion list was shown; waiting for the entry number.
    /// `reminders` is the list in the order it was displayed.
    WaitingForDeleteId { reminders: Vec<Reminder> },
    /// Waiting for the delete-all confirmation word
    WaitingForDeleteAllConfirmation,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    pub fail_count: u32,
}

/// Thread-safe session map shared by the webhook handlers.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: DashMap::new(),
        }
    }

    pub fn start_waiting_for_time(&self, user_id: &str, message: &str) {
        self.sessions.insert(
            user_id.to_string(),
            Session {
                state: SessionState::WaitingForTime {
                    message: message.to_string(),
                },
                fail_count: 0,
            },
        );
    }

    pub fn start_waiting_for_delete_id(&self, user_id: &str, reminders: Vec<Reminder>) {
        self.sessions.insert(
            user_id.to_string(),
            Session {
                state: SessionState::WaitingForDeleteId { reminders },
                fail_count: 0,
            },
        );
    }

    pub fn start_waiting_for_delete_all_confirmation(&self, user_id: &str) {
        self.sessions.insert(
            user_id.to_string(),
            Session {
                state: SessionState::WaitingForDeleteAllConfirmation,
                fail_count: 0,
            },
        );
    }

    pub fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.get(user_id).map(|s| s.clone())
    }

    pub fn clear(&self, user_id: &str) {
        self.sessions.remove(user_id);
    }

    /// Bump and return the fail count for an active session. Returns 0
    /// when the user has no session.
    pub fn increment_fail_count(&self, user_id: &str) -> u32 {
        match self.sessions.get_mut(user_id) {
            Some(mut session) => {
                session.fail_count += 1;
                session.fail_count
            }
            None => 0,
        }
    }
}
