//! Quick-reply button sets used across the registration flow.

use crate::line::messages::{QuickReply, QuickReplyItem};

/// Most reminders the deletion menu will offer individual buttons for
const MAX_DELETE_BUTTONS: usize = 10;

/// Time suggestions shown while waiting for a time expression.
pub fn time_suggestions() -> QuickReply {
    QuickReply {
        items: vec![
            QuickReplyItem::message("10分後", "10分後"),
            QuickReplyItem::message("30分後", "30分後"),
            QuickReplyItem::message("1時間後", "1時間後"),
            QuickReplyItem::message("明日9時", "明日 9時"),
            QuickReplyItem::message("明日20時", "明日 20時"),
            QuickReplyItem::message("毎週月曜20時", "毎週月曜 20時"),
            QuickReplyItem::message("キャンセル", "キャンセル"),
        ],
    }
}

/// The main menu offered after most completed interactions.
pub fn main_menu() -> QuickReply {
    QuickReply {
        items: vec![
            QuickReplyItem::message("リマインド設定", "リマインド設定"),
            QuickReplyItem::message("リマインド一覧", "リマインド一覧"),
            QuickReplyItem::message("リマインド削除", "リマインド削除"),
        ],
    }
}

/// Numbered deletion buttons for up to ten reminders, plus delete-all
/// and cancel.
pub fn delete_choices(reminder_count: usize) -> QuickReply {
    let mut items = Vec::new();

    for i in 1..=reminder_count.min(MAX_DELETE_BUTTONS) {
        items.push(QuickReplyItem::message(format!("{i}を削除"), i.to_string()));
    }
    items.push(QuickReplyItem::message("すべてを削除", "すべてを削除"));
    items.push(QuickReplyItem::message("キャンセル", "キャンセル"));

    QuickReply { items }
}
