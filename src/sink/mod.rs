pub mod webhook;

pub use webhook::WebhookSink;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A destination-ready message: either plain text or a rich card, never
/// both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub text: Option<String>,
    pub card: Option<RichCard>,
}

impl Payload {
    pub fn text(text: String) -> Self {
        Self {
            text: Some(text),
            card: None,
        }
    }

    pub fn card(card: RichCard) -> Self {
        Self {
            text: None,
            card: Some(card),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichCard {
    /// Author line: name, board-assigned hash, signature.
    pub author: String,
    pub description: String,
    /// Accent color as 0xRRGGBB, supplied by the sink profile.
    pub color: u32,
    /// Source-reported post time.
    pub timestamp: DateTime<Utc>,
    /// Human-readable rendering of `timestamp`, shown in the footer.
    pub footer: String,
    pub thumbnail_url: Option<String>,
}

/// Ambient rendering preferences of one destination, resolved once per
/// destination per tick.
#[derive(Debug, Clone, Copy)]
pub struct SinkProfile {
    pub embed_default: bool,
    pub accent_color: u32,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Non-success HTTP status, rate limiting included.
    #[error("Destination returned HTTP {status}")]
    Http { status: u16 },

    #[error("Destination refused delivery (forbidden)")]
    Forbidden,

    #[error("Destination rejected payload: {0}")]
    InvalidPayload(String),

    #[error("Destination unreachable: {0}")]
    Network(String),
}

#[async_trait]
pub trait Sink {
    /// Rendering profile for a destination, or `None` when the sink does
    /// not know the destination (e.g. it was removed from configuration
    /// while feeds for it remain stored).
    async fn profile(&self, destination: &str) -> Option<SinkProfile>;

    async fn deliver(&self, destination: &str, payload: &Payload) -> Result<(), DeliveryError>;
}
