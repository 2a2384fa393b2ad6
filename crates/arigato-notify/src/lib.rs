//! Push notification dispatch.
//!
//! Observes message creation and forwards a short preview to the delivery
//! endpoint for recipients that registered a push token. Strictly
//! fire-and-forget: delivery failures are logged and swallowed, never
//! surfaced to the sender.

use std::sync::Arc;

use tracing::{debug, warn};

use arigato_types::models::{Message, User};

const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    /// Delivery endpoint URL; `None` disables push entirely.
    pub endpoint: Option<String>,
    /// Bearer credential for the delivery endpoint.
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    client: reqwest::Client,
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }

    /// Observe a newly created message and dispatch a push for it. Skips
    /// self-sends and recipients without a token.
    pub fn message_created(&self, message: &Message, recipient: Option<&User>) {
        if message.from_id == message.to_id {
            return;
        }

        let Some(endpoint) = self.inner.config.endpoint.clone() else {
            debug!("Push delivery disabled; dropping notification for {}", message.id);
            return;
        };
        let Some(token) = recipient.and_then(|u| u.push_token.clone()) else {
            debug!("No push token for {}; skipping notification", message.to_id);
            return;
        };

        let payload = serde_json::json!({
            "token": token,
            "title": "ありがとうが届きました！",
            "body": format!("{}さん: {}", message.from_name, preview(&message.body)),
        });

        let message_id = message.id.clone();
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut request = inner.client.post(&endpoint).json(&payload);
            if let Some(key) = &inner.config.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!("Push delivered for message {}", message_id);
                }
                Ok(resp) => {
                    warn!(
                        "Push endpoint returned {} for message {}",
                        resp.status(),
                        message_id
                    );
                }
                Err(e) => {
                    warn!("Push delivery failed for message {}: {}", message_id, e);
                }
            }
        });
    }
}

/// Body preview, truncated on a character boundary and ellipsized.
fn preview(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
