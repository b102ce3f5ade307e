//! LINE Messaging API client.
//!
//! Push (the sweep notifier), reply, and webhook signature verification.
//! Push reports success/failure only; retry policy belongs to the sweep.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use log::{debug, error};
use sha2::Sha256;

use crate::features::sweep::Notifier;
use crate::line::messages::{Message, PushRequest, ReplyRequest};

/// Push message endpoint
pub const LINE_PUSH_MESSAGE_URL: &str = "https://api.line.me/v2/bot/message/push";

/// Reply message endpoint
pub const LINE_REPLY_MESSAGE_URL: &str = "https://api.line.me/v2/bot/message/reply";

#[derive(Debug, Clone)]
pub struct LineClient {
    http: reqwest::Client,
    access_token: String,
}

impl LineClient {
    pub fn new(access_token: String) -> Self {
        LineClient {
            http: reqwest::Client::new(),
            access_token,
        }
    }

    /// Send a push message to a user. Returns `false` on any failure;
    /// the caller decides whether to retry.
    pub async fn push_message(&self, user_id: &str, text: &str) -> bool {
        let payload = PushRequest {
            to: user_id.to_string(),
            messages: vec![Message::text(text)],
        };

        let response = self
            .http
            .post(LINE_PUSH_MESSAGE_URL)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!("Pushed message to {user_id}");
                true
            }
            Ok(resp) => {
                error!("LINE push to {user_id} failed: HTTP {}", resp.status());
                false
            }
            Err(e) => {
                error!("Failed to send push message: {e}");
                false
            }
        }
    }

    /// Answer a webhook event through its reply token.
    pub async fn reply_message(&self, reply_token: &str, messages: Vec<Message>) -> Result<()> {
        let payload = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        let response = self
            .http
            .post(LINE_REPLY_MESSAGE_URL)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("LINE reply failed: HTTP {status}"));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for LineClient {
    async fn notify(&self, user_id: &str, text: &str) -> bool {
        self.push_message(user_id, text).await
    }
}

/// Verify the `X-Line-Signature` header: base64 of HMAC-SHA256 over the
/// raw request body, keyed with the channel secret.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = BASE64.encode(mac.finalize().into_bytes());
    expected == signature
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-channel-secret";
    const BODY: &[u8] = br#"{"events":[]}"#;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign(SECRET, BODY);
        assert!(verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let signature = sign(SECRET, BODY);
        assert!(!verify_signature(
            SECRET,
            br#"{"events":[{}]}"#,
            &signature
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign("other-secret", BODY);
        assert!(!verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_garbage_signature_rejected() {
        assert!(!verify_signature(SECRET, BODY, "not base64 at all"));
        assert!(!verify_signature(SECRET, BODY, ""));
    }
}
