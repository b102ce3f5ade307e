//! Wire types for the LINE Messaging API.
//!
//! Outbound messages (push/reply with optional quick-reply buttons) and
//! the subset of inbound webhook events the bot reacts to. Field names
//! follow the LINE JSON payloads.

use serde::{Deserialize, Serialize};

// ============================================================================
// Outbound
// ============================================================================

/// A text message, optionally carrying quick-reply buttons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReply>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message {
            kind: "text".to_string(),
            text: text.into(),
            quick_reply: None,
        }
    }

    pub fn with_quick_reply(mut self, quick_reply: Option<QuickReply>) -> Self {
        self.quick_reply = quick_reply;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickReply {
    pub items: Vec<QuickReplyItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickReplyItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub action: MessageAction,
}

impl QuickReplyItem {
    /// A button that sends `text` as the user's next message.
    pub fn message(label: impl Into<String>, text: impl Into<String>) -> Self {
        QuickReplyItem {
            kind: "action".to_string(),
            action: MessageAction {
                kind: "message".to_string(),
                label: label.into(),
                text: text.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PushRequest {
    pub to: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<Message>,
}

// ============================================================================
// Inbound webhook events
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl WebhookEvent {
    /// The text of an inbound text-message event, if that is what this is.
    pub fn text_message(&self) -> Option<(&str, &str)> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        let user_id = self.source.as_ref()?.user_id.as_deref()?;
        Some((user_id, message.text.as_deref()?))
    }
}
