use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One deliverable unit of a thread: the topic post or a reply.
///
/// `number` is unique and strictly increasing within a thread; it is the
/// ordering the whole sync engine relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub number: u64,
    /// Source-reported unix timestamp, not wall clock.
    pub timestamp: i64,
    pub author_name: String,
    /// Board-assigned poster id, when the board exposes one.
    pub author_hash: Option<String>,
    /// Tripcode-style signature, when present.
    pub signature: Option<String>,
    /// Comment as the source returned it (HTML markup included).
    pub raw_text: String,
    /// Comment with markup already rendered to text upstream.
    pub rendered_text: String,
    /// Permalink to this post within its thread.
    pub url: String,
    pub media_url: Option<String>,
}

impl Post {
    /// Human-readable UTC timestamp in the board's customary layout,
    /// e.g. `03/14/24 (Thu) 09:26:53`.
    pub fn format_timestamp(&self) -> String {
        match DateTime::<Utc>::from_timestamp(self.timestamp, 0) {
            Some(dt) => dt.format("%m/%d/%y (%a) %H:%M:%S").to_string(),
            None => String::from("(unknown time)"),
        }
    }

    /// The six leading UTC struct-time fields of this post's timestamp:
    /// `[year, month, day, hour, minute, second]`.
    pub fn timestamp_fields(&self) -> [i64; 6] {
        utc_fields(self.timestamp)
    }
}

/// Decompose a unix timestamp into `[year, month, day, hour, minute,
/// second]` in UTC. Out-of-range timestamps decompose to all zeros.
pub fn utc_fields(timestamp: i64) -> [i64; 6] {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => [
            i64::from(dt.year()),
            i64::from(dt.month()),
            i64::from(dt.day()),
            i64::from(dt.hour()),
            i64::from(dt.minute()),
            i64::from(dt.second()),
        ],
        None => [0; 6],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            number: 123,
            timestamp: 1_700_000_000, // 2023-11-14 22:13:20 UTC
            author_name: "Anonymous".into(),
            author_hash: None,
            signature: None,
            raw_text: String::new(),
            rendered_text: String::new(),
            url: "https://boards.example.org/g/thread/100#p123".into(),
            media_url: None,
        }
    }

    #[test]
    fn test_format_timestamp() {
        let post = sample_post();
        assert_eq!(post.format_timestamp(), "11/14/23 (Tue) 22:13:20");
    }

    #[test]
    fn test_utc_fields() {
        assert_eq!(utc_fields(1_700_000_000), [2023, 11, 14, 22, 13, 20]);
    }

    #[test]
    fn test_utc_fields_epoch() {
        assert_eq!(utc_fields(0), [1970, 1, 1, 0, 0, 0]);
    }
}
