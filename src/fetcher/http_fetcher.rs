use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::{Post, ThreadSnapshot};
use crate::fetcher::{FetchError, ThreadFetcher};

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Base URLs of a 4chan-compatible source. Split three ways because the
/// API, the HTML board pages (used for permalinks), and the media CDN
/// live on different hosts.
#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    pub api_base: String,
    pub boards_base: String,
    pub media_base: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://a.4cdn.org".to_string(),
            boards_base: "https://boards.4chan.org".to_string(),
            media_base: "https://i.4cdn.org".to_string(),
        }
    }
}

pub struct HttpThreadFetcher {
    client: Client,
    endpoints: SourceEndpoints,
}

impl HttpThreadFetcher {
    pub fn new(endpoints: SourceEndpoints, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent("threadcast/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client, endpoints }
    }

    /// Whether the source knows the board at all. Consulted after a 404
    /// so a missing board and a dead thread stay distinct error kinds.
    async fn board_exists(&self, board: &str) -> Result<bool, FetchError> {
        let url = format!("{}/boards.json", self.endpoints.api_base);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(FetchError::Unexpected(format!(
                "boards.json returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let payload: BoardsPayload = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Unexpected(e.to_string()))?;

        Ok(payload.boards.iter().any(|b| b.board == board))
    }
}

impl Default for HttpThreadFetcher {
    fn default() -> Self {
        Self::new(SourceEndpoints::default(), DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl ThreadFetcher for HttpThreadFetcher {
    async fn fetch_thread(
        &self,
        board: &str,
        thread_id: &str,
    ) -> Result<ThreadSnapshot, FetchError> {
        let url = format!(
            "{}/{}/thread/{}.json",
            self.endpoints.api_base, board, thread_id
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return if self.board_exists(board).await? {
                Err(FetchError::ThreadNotFound(
                    board.to_string(),
                    thread_id.to_string(),
                ))
            } else {
                Err(FetchError::BoardNotFound(board.to_string()))
            };
        }

        if !response.status().is_success() {
            return Err(FetchError::Unexpected(format!(
                "thread fetch returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let payload: ThreadPayload = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Unexpected(e.to_string()))?;

        snapshot_from_payload(payload, board, thread_id, &self.endpoints)
    }
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Unreachable(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ThreadPayload {
    posts: Vec<PostPayload>,
}

/// Wire shape of one post. Flags arrive as 0/1 integers and the thread
/// status fields only appear on the topic post.
#[derive(Debug, Deserialize)]
struct PostPayload {
    no: u64,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    trip: Option<String>,
    #[serde(default)]
    com: Option<String>,
    #[serde(default)]
    tim: Option<u64>,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    archived: Option<u8>,
    #[serde(default)]
    sticky: Option<u8>,
    #[serde(default)]
    bumplimit: Option<u8>,
    #[serde(default)]
    images: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BoardsPayload {
    boards: Vec<BoardPayload>,
}

#[derive(Debug, Deserialize)]
struct BoardPayload {
    board: String,
}

fn snapshot_from_payload(
    payload: ThreadPayload,
    board: &str,
    thread_id: &str,
    endpoints: &SourceEndpoints,
) -> Result<ThreadSnapshot, FetchError> {
    let mut posts = payload.posts.into_iter();
    let op = posts
        .next()
        .ok_or_else(|| FetchError::Unexpected("thread payload contained no posts".into()))?;

    let archived = op.archived.unwrap_or(0) != 0;
    let sticky = op.sticky.unwrap_or(0) != 0;
    let bump_limit = op.bumplimit.unwrap_or(0) != 0;
    let image_count = op.images.unwrap_or(0);

    let topic = post_from_payload(op, board, thread_id, endpoints);
    let replies: Vec<Post> = posts
        .map(|p| post_from_payload(p, board, thread_id, endpoints))
        .collect();

    let last_reply_id = replies.last().map(|p| p.number).unwrap_or(topic.number);

    Ok(ThreadSnapshot {
        board: board.to_string(),
        thread_id: thread_id.to_string(),
        topic,
        replies,
        last_reply_id,
        archived,
        sticky,
        bump_limit,
        image_count,
    })
}

fn post_from_payload(
    p: PostPayload,
    board: &str,
    thread_id: &str,
    endpoints: &SourceEndpoints,
) -> Post {
    let raw_text = p.com.unwrap_or_default();
    let rendered_text = clean_comment(&raw_text);

    let media_url = match (p.tim, p.ext) {
        (Some(tim), Some(ext)) => Some(format!(
            "{}/{}/{}{}",
            endpoints.media_base, board, tim, ext
        )),
        _ => None,
    };

    Post {
        number: p.no,
        timestamp: p.time,
        author_name: p.name.unwrap_or_else(|| "Anonymous".to_string()),
        author_hash: p.id,
        signature: p.trip,
        raw_text,
        rendered_text,
        url: format!(
            "{}/{}/thread/{}#p{}",
            endpoints.boards_base, board, thread_id, p.no
        ),
        media_url,
    }
}

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br\s*/?>").expect("valid regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Render the source's HTML comment markup to plain text: line breaks
/// become newlines, remaining tags are stripped, entities are decoded.
/// Quote markers (`>>123`, `>text`) survive as literal text for the
/// formatter to rewrite.
pub fn clean_comment(html: &str) -> String {
    let text = BR_RE.replace_all(html, "\n");
    let text = TAG_RE.replace_all(&text, "");
    html_escape::decode_html_entities(&text).to_string()
}
