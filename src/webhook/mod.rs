//! # Webhook Server
//!
//! HTTP surface for LINE webhook events: signature-checked callback plus
//! a health endpoint. Event handling is delegated to [`flow`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0

pub mod flow;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use log::{error, warn};
use serde_json::json;
use std::sync::Arc;

use crate::core::Config;
use crate::features::sessions::SessionStore;
use crate::line::client::{verify_signature, LineClient};
use crate::line::messages::{Message, WebhookRequest};
use crate::storage::Storage;

/// Signature header LINE attaches to every webhook request
const SIGNATURE_HEADER: &str = "x-line-signature";

/// Shared state for the webhook handlers.
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub sessions: SessionStore,
    pub line: LineClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let storage = Storage::new(&config.data_dir);
        let line = LineClient::new(config.channel_access_token.clone());
        AppState {
            config,
            storage,
            sessions: SessionStore::new(),
            line,
        }
    }
}

/// Build the webhook router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reminder/callback", post(callback))
        .route("/reminder/health", get(health))
        .with_state(state)
}

async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("Webhook request without {SIGNATURE_HEADER} header");
        return StatusCode::BAD_REQUEST;
    };

    if !verify_signature(&state.config.channel_secret, &body, signature) {
        warn!("Invalid webhook signature");
        return StatusCode::BAD_REQUEST;
    }

    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Unparseable webhook body: {e}");
            return StatusCode::BAD_REQUEST;
        }
    };

    for event in &request.events {
        let Some((user_id, text)) = event.text_message() else {
            continue;
        };
        let Some(reply_token) = event.reply_token.as_deref() else {
            continue;
        };

        let now = state.config.now();
        let response =
            flow::handle_text_message(&state.storage, &state.sessions, now, user_id, text);

        let message = Message::text(response.text).with_quick_reply(response.quick_reply);
        if let Err(e) = state.line.reply_message(reply_token, vec![message]).await {
            error!("Failed to reply to {user_id}: {e:#}");
        }
    }

    StatusCode::OK
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Reminder bot webhook server is running"
    }))
}
