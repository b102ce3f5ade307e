//! # LINE Messaging Layer
//!
//! Client, wire types, and quick-reply builders for the LINE Messaging
//! API. The push path doubles as the sweep engine's notifier.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0

pub mod client;
pub mod messages;
pub mod quick_reply;

pub use client::{verify_signature, LineClient};
pub use messages::{
    EventMessage, EventSource, Message, MessageAction, QuickReply, QuickReplyItem, WebhookEvent,
    WebhookRequest,
};
