use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::sink::{DeliveryError, Payload, Sink, SinkProfile};

const DELIVER_TIMEOUT_SECS: u64 = 10;

/// One configured webhook target.
#[derive(Debug, Clone)]
pub struct WebhookDestination {
    pub webhook_url: String,
    pub embed_default: bool,
    pub accent_color: u32,
}

/// Discord-compatible webhook sink. Destinations come from configuration
/// and are addressed by their config key.
pub struct WebhookSink {
    client: Client,
    destinations: HashMap<String, WebhookDestination>,
}

impl WebhookSink {
    pub fn new(destinations: HashMap<String, WebhookDestination>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DELIVER_TIMEOUT_SECS))
            .user_agent("threadcast/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            destinations,
        }
    }

}

#[async_trait]
impl Sink for WebhookSink {
    async fn profile(&self, destination: &str) -> Option<SinkProfile> {
        self.destinations.get(destination).map(|d| SinkProfile {
            embed_default: d.embed_default,
            accent_color: d.accent_color,
        })
    }

    async fn deliver(&self, destination: &str, payload: &Payload) -> Result<(), DeliveryError> {
        let dest = self.destinations.get(destination).ok_or_else(|| {
            DeliveryError::InvalidPayload(format!("no destination configured: {}", destination))
        })?;

        let body = webhook_body(payload);

        let response = self
            .client
            .post(&dest.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Network("request timed out".to_string())
                } else {
                    DeliveryError::Network(e.to_string())
                }
            })?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DeliveryError::Forbidden),
            StatusCode::BAD_REQUEST => {
                let detail = response.text().await.unwrap_or_default();
                Err(DeliveryError::InvalidPayload(detail))
            }
            s => Err(DeliveryError::Http { status: s.as_u16() }),
        }
    }
}

/// Webhook JSON for a payload: `content` for plain text, an `embeds`
/// array for a card.
fn webhook_body(payload: &Payload) -> Value {
    if let Some(ref card) = payload.card {
        let mut embed = json!({
            "author": { "name": card.author },
            "description": card.description,
            "color": card.color,
            "timestamp": card.timestamp.to_rfc3339(),
            "footer": { "text": card.footer },
        });
        if let Some(ref thumb) = card.thumbnail_url {
            embed["image"] = json!({ "url": thumb });
        }
        json!({ "embeds": [embed] })
    } else {
        json!({ "content": payload.text.as_deref().unwrap_or("") })
    }
}
