use serde::{Deserialize, Serialize};

use crate::domain::snapshot::ThreadSnapshot;

/// Per-feed rendering preference. `Inherit` falls back to the
/// destination's ambient default at delivery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmbedMode {
    #[default]
    Inherit,
    ForceOn,
    ForceOff,
}

impl EmbedMode {
    pub fn resolve(self, destination_default: bool) -> bool {
        match self {
            EmbedMode::Inherit => destination_default,
            EmbedMode::ForceOn => true,
            EmbedMode::ForceOff => false,
        }
    }
}

impl std::str::FromStr for EmbedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" => Ok(EmbedMode::ForceOn),
            "off" | "false" | "no" => Ok(EmbedMode::ForceOff),
            "default" | "inherit" => Ok(EmbedMode::Inherit),
            other => Err(format!(
                "Invalid embed mode '{}'. Use on, off, or default",
                other
            )),
        }
    }
}

impl std::fmt::Display for EmbedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EmbedMode::Inherit => "default",
            EmbedMode::ForceOn => "on",
            EmbedMode::ForceOff => "off",
        };
        f.write_str(s)
    }
}

/// Persisted synchronization state for one feed.
///
/// The cursor fields (`last_post_id`, `reply_count`, `last_delivered_at`)
/// always describe the last *successfully delivered* item. A
/// `last_post_id` of zero means the feed has never delivered anything and
/// the next sync establishes a baseline instead of replaying history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub url: String,
    pub embed_override: EmbedMode,
    pub last_post_id: u64,
    pub reply_count: u64,
    /// `[year, month, day, hour, minute, second]` in UTC of the last
    /// delivered item's source timestamp.
    pub last_delivered_at: Option<[i64; 6]>,
    pub image_count: u64,
    pub is_archived: bool,
    pub is_sticky: bool,
    pub is_at_bump_limit: bool,
}

impl FeedRecord {
    /// A record with no delivery history, as stored for a feed whose
    /// persisted fields were missing or unreadable.
    pub fn empty(url: String) -> Self {
        Self {
            url,
            embed_override: EmbedMode::Inherit,
            last_post_id: 0,
            reply_count: 0,
            last_delivered_at: None,
            image_count: 0,
            is_archived: false,
            is_sticky: false,
            is_at_bump_limit: false,
        }
    }

    /// A freshly added feed's record: the cursor is pinned to the
    /// thread's current latest item so history is never backfilled.
    pub fn baseline(url: String, snapshot: &ThreadSnapshot) -> Self {
        let latest = snapshot.latest_item();
        Self {
            url,
            embed_override: EmbedMode::Inherit,
            last_post_id: snapshot.last_reply_id,
            reply_count: snapshot.reply_count(),
            last_delivered_at: Some(latest.timestamp_fields()),
            image_count: snapshot.image_count,
            is_archived: snapshot.archived,
            is_sticky: snapshot.sticky,
            is_at_bump_limit: snapshot.bump_limit,
        }
    }
}
