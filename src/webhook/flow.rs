//! Interactive conversation flow.
//!
//! One inbound text message in, one reply out. The flow is a small state
//! machine per user:
//!
//! 1. Any free text starts a registration session and asks for a time.
//! 2. The time answer is parsed; on success the reminder is stored.
//! 3. 「リマインド一覧」/「リマインド削除」 work from any idle state;
//!    deletion walks through number selection and an optional
//!    delete-all confirmation.
//!
//! Five failed answers abort the active session.

use chrono::DateTime;
use chrono_tz::Tz;
use log::{error, info};

use crate::features::parser;
use crate::features::reminders::{
    format_deletion_list, format_reminder_list, sorted_pending_for_user, Reminder,
};
use crate::features::sessions::{SessionState, SessionStore, MAX_FAIL_COUNT};
use crate::line::messages::QuickReply;
use crate::line::quick_reply;
use crate::storage::Storage;

/// Commands recognized outside a session
const CMD_LIST: &str = "リマインド一覧";
const CMD_DELETE: &str = "リマインド削除";
const CMD_SETUP: &str = "リマインド設定";
const CMD_DELETE_ALL: &str = "すべてを削除";

/// The reply to send back for one inbound text message.
#[derive(Debug)]
pub struct FlowResponse {
    pub text: String,
    pub quick_reply: Option<QuickReply>,
}

impl FlowResponse {
    fn new(text: impl Into<String>, quick_reply: Option<QuickReply>) -> Self {
        FlowResponse {
            text: text.into(),
            quick_reply,
        }
    }
}

/// Drive the conversation state machine for one inbound message.
pub fn handle_text_message(
    storage: &Storage,
    sessions: &SessionStore,
    now: DateTime<Tz>,
    user_id: &str,
    text: &str,
) -> FlowResponse {
    let text = text.trim();

    // List and delete commands work regardless of session state
    if text == CMD_LIST {
        return list_reminders(storage, sessions, now, user_id);
    }
    if text == CMD_DELETE {
        return start_deletion(storage, sessions, now, user_id);
    }

    match sessions.get(user_id).map(|s| s.state) {
        Some(SessionState::WaitingForTime { message }) => {
            waiting_for_time(storage, sessions, now, user_id, text, &message)
        }
        Some(SessionState::WaitingForDeleteId { reminders }) => {
            waiting_for_delete_id(storage, sessions, user_id, text, &reminders)
        }
        Some(SessionState::WaitingForDeleteAllConfirmation) => {
            waiting_for_delete_all(storage, sessions, user_id, text)
        }
        None => idle(sessions, user_id, text),
    }
}

// ============================================================================
// Idle state
// ============================================================================

fn idle(sessions: &SessionStore, user_id: &str, text: &str) -> FlowResponse {
    if text == CMD_SETUP {
        return FlowResponse::new(
            "リマインダーの内容を入力してください。\n\n\
             例:\n\
             • お金の振り込み\n\
             • エントリーシートを送る\n\
             • 課題を提出する",
            Some(quick_reply::main_menu()),
        );
    }

    // Anything else is a new reminder message; ask when to fire
    sessions.start_waiting_for_time(user_id, text);
    FlowResponse::new(
        format!("「{text}」\n\nいつ通知しますか？"),
        Some(quick_reply::time_suggestions()),
    )
}

// ============================================================================
// Registration: waiting for the time expression
// ============================================================================

fn waiting_for_time(
    storage: &Storage,
    sessions: &SessionStore,
    now: DateTime<Tz>,
    user_id: &str,
    text: &str,
    message: &str,
) -> FlowResponse {
    if is_cancel(text) {
        sessions.clear(user_id);
        return FlowResponse::new(
            "リマインダーの登録をキャンセルしました。",
            Some(quick_reply::main_menu()),
        );
    }

    let Some(parsed) = parser::parse(text, now) else {
        let fail_count = sessions.increment_fail_count(user_id);
        if fail_count >= MAX_FAIL_COUNT {
            sessions.clear(user_id);
            return FlowResponse::new(
                format!(
                    "⚠️ {MAX_FAIL_COUNT}回失敗したため、リマインダーの登録を中止しました。\n\
                     最初からやり直してください。"
                ),
                Some(quick_reply::main_menu()),
            );
        }
        return FlowResponse::new(
            format!(
                "⚠️ 時刻の形式を認識できませんでした。（{fail_count}/{MAX_FAIL_COUNT}回目）\n\n\
                 指定された時刻が既に過ぎている可能性があります。\n\n\
                 以下の形式で送信してください:\n\
                 • 10分後 / 2時間後\n\
                 • 22:00 / 14時 / 午後3時\n\
                 • 今日の22:00 / 明日午後3時\n\
                 • 毎週日曜日 20時\n\
                 • 2025年5月3日 / 11/20\n\n\
                 登録をやめる場合は「キャンセル」と送信してください。"
            ),
            Some(quick_reply::time_suggestions()),
        );
    };

    sessions.clear(user_id);

    let reminder = Reminder::new(user_id, message, parsed.schedule, now);
    match storage.add(reminder) {
        Ok(()) => {
            info!("Registered reminder for {user_id} at {}", parsed.description);
            FlowResponse::new(
                format!(
                    "✅ リマインダーを登録しました。\n\n\
                     時刻: {}\n\
                     内容: 「{message}」",
                    parsed.description
                ),
                Some(quick_reply::main_menu()),
            )
        }
        Err(e) => {
            error!("Error saving reminder: {e:#}");
            FlowResponse::new(
                "❌ リマインダーの登録に失敗しました。",
                Some(quick_reply::main_menu()),
            )
        }
    }
}

// ============================================================================
// Listing and deletion
// ============================================================================

fn list_reminders(
    storage: &Storage,
    _sessions: &SessionStore,
    now: DateTime<Tz>,
    user_id: &str,
) -> FlowResponse {
    match storage.load() {
        Ok(reminders) => {
            let mine = sorted_pending_for_user(&reminders, user_id);
            FlowResponse::new(
                format_reminder_list(&mine, now.timezone()),
                Some(quick_reply::main_menu()),
            )
        }
        Err(e) => {
            error!("Error loading reminders: {e:#}");
            FlowResponse::new(
                "❌ リマインダーの読み込みに失敗しました。",
                Some(quick_reply::main_menu()),
            )
        }
    }
}

fn start_deletion(
    storage: &Storage,
    sessions: &SessionStore,
    now: DateTime<Tz>,
    user_id: &str,
) -> FlowResponse {
    let reminders = match storage.load() {
        Ok(reminders) => sorted_pending_for_user(&reminders, user_id),
        Err(e) => {
            error!("Error loading reminders: {e:#}");
            return FlowResponse::new(
                "❌ リマインダーの読み込みに失敗しました。",
                Some(quick_reply::main_menu()),
            );
        }
    };

    if reminders.is_empty() {
        return FlowResponse::new(
            "📋 削除できるリマインダーはありません。",
            Some(quick_reply::main_menu()),
        );
    }

    let listing = format_deletion_list(&reminders, now.timezone());
    let count = reminders.len();
    sessions.start_waiting_for_delete_id(user_id, reminders);
    FlowResponse::new(listing, Some(quick_reply::delete_choices(count)))
}

fn waiting_for_delete_id(
    storage: &Storage,
    sessions: &SessionStore,
    user_id: &str,
    text: &str,
    reminders: &[Reminder],
) -> FlowResponse {
    if is_cancel(text) {
        sessions.clear(user_id);
        return FlowResponse::new(
            "リマインダーの削除をキャンセルしました。",
            Some(quick_reply::main_menu()),
        );
    }

    if text == CMD_DELETE_ALL {
        sessions.start_waiting_for_delete_all_confirmation(user_id);
        return FlowResponse::new(
            "⚠️ 本当にすべてのリマインダーを削除しますか？\n\n\
             削除する場合は「削除」と送信してください。\n\
             キャンセルする場合は「キャンセル」と送信してください。",
            None,
        );
    }

    let choice = match text.parse::<usize>() {
        Ok(n) if (1..=reminders.len()).contains(&n) => n,
        Ok(_) => {
            return delete_failure(
                sessions,
                user_id,
                reminders.len(),
                "⚠️ 無効な番号です。",
            )
        }
        Err(_) => {
            return delete_failure(
                sessions,
                user_id,
                reminders.len(),
                "⚠️ 数字を送信してください。",
            )
        }
    };

    sessions.clear(user_id);
    let target = &reminders[choice - 1];
    match storage.delete_by_id(&target.id) {
        Ok(true) => {
            info!("Deleted reminder {} for {user_id}", target.id);
            FlowResponse::new(
                format!(
                    "✅ リマインダーを削除しました。\n\n内容: 「{}」",
                    target.text
                ),
                Some(quick_reply::main_menu()),
            )
        }
        Ok(false) => FlowResponse::new(
            "❌ リマインダーの削除に失敗しました。",
            Some(quick_reply::main_menu()),
        ),
        Err(e) => {
            error!("Error deleting reminder: {e:#}");
            FlowResponse::new(
                "❌ リマインダーの削除に失敗しました。",
                Some(quick_reply::main_menu()),
            )
        }
    }
}

fn delete_failure(
    sessions: &SessionStore,
    user_id: &str,
    reminder_count: usize,
    problem: &str,
) -> FlowResponse {
    let fail_count = sessions.increment_fail_count(user_id);
    if fail_count >= MAX_FAIL_COUNT {
        sessions.clear(user_id);
        return FlowResponse::new(
            format!(
                "⚠️ {MAX_FAIL_COUNT}回失敗したため、削除を中止しました。\n\
                 最初からやり直してください。"
            ),
            Some(quick_reply::main_menu()),
        );
    }
    FlowResponse::new(
        format!(
            "{problem}（{fail_count}/{MAX_FAIL_COUNT}回目）\n\n\
             1〜{reminder_count}の番号を送信してください。\n\
             削除をやめる場合は「キャンセル」と送信してください。"
        ),
        Some(quick_reply::delete_choices(reminder_count)),
    )
}

fn waiting_for_delete_all(
    storage: &Storage,
    sessions: &SessionStore,
    user_id: &str,
    text: &str,
) -> FlowResponse {
    if matches!(text, "削除" | "はい" | "yes") {
        sessions.clear(user_id);
        return match storage.delete_all_for_user(user_id) {
            Ok(0) => FlowResponse::new(
                "削除するリマインダーがありませんでした。",
                Some(quick_reply::main_menu()),
            ),
            Ok(count) => {
                info!("Deleted all {count} reminders for {user_id}");
                FlowResponse::new(
                    format!("✅ すべてのリマインダー（{count}件）を削除しました。"),
                    Some(quick_reply::main_menu()),
                )
            }
            Err(e) => {
                error!("Error deleting reminders: {e:#}");
                FlowResponse::new(
                    "❌ リマインダーの削除に失敗しました。",
                    Some(quick_reply::main_menu()),
                )
            }
        };
    }

    if is_cancel(text) || matches!(text, "いいえ" | "no") {
        sessions.clear(user_id);
        return FlowResponse::new(
            "すべての削除をキャンセルしました。",
            Some(quick_reply::main_menu()),
        );
    }

    let fail_count = sessions.increment_fail_count(user_id);
    if fail_count >= MAX_FAIL_COUNT {
        sessions.clear(user_id);
        return FlowResponse::new(
            format!(
                "⚠️ {MAX_FAIL_COUNT}回失敗したため、削除を中止しました。\n\
                 最初からやり直してください。"
            ),
            Some(quick_reply::main_menu()),
        );
    }
    FlowResponse::new(
        format!(
            "⚠️ 「削除」または「キャンセル」と送信してください。（{fail_count}/{MAX_FAIL_COUNT}回目）"
        ),
        None,
    )
}

fn is_cancel(text: &str) -> bool {
    matches!(text.to_lowercase().as_str(), "キャンセル" | "cancel" | "やめる")
}
