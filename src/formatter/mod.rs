//! Renders posts into destination-ready payloads.
//!
//! Reference rewriting runs as a fixed sequence of regex substitution
//! rules over immutable input text. The order is load-bearing: rule
//! output contains markdown link syntax whose literal text a later rule
//! could match, so the bare cross-board rule runs before the
//! thread-suffixed one and nothing runs after the rules that emit
//! `>>>`-bearing link text.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::domain::Post;
use crate::sink::{Payload, RichCard};

/// Plain-text bodies truncate to this many characters.
pub const PLAIN_TEXT_LIMIT: usize = 1900;
/// Rich-card description bodies truncate to this many characters.
pub const CARD_TEXT_LIMIT: usize = 1999;
/// Bodies at or under this length pass through untouched.
const OVERFLOW_THRESHOLD: usize = 2000;
const TRUNCATION_SUFFIX: &str = "... (post is too long)";

/// Rule 1: same-thread quote, `>>123`.
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r">{2}(\d+)").expect("valid regex"));
/// Rule 2: cross-board reference without a thread, `>>>/board/`.
/// The trailing capture keeps the rule from eating thread-suffixed forms.
static CROSS_BOARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">{3}(/[a-z0-9]+/)([^0-9]|$)").expect("valid regex"));
/// Rule 3: cross-board reference with a thread, `>>>/board/123`.
static CROSS_THREAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">{3}(/[a-z0-9]+/)(\d+)").expect("valid regex"));

/// Convert one post into a payload for delivery.
///
/// `embed` selects between a rich card and plain text; `accent_color` is
/// the sink-provided card color and is unused for plain text.
pub fn render(post: &Post, embed: bool, accent_color: u32) -> Payload {
    let (thread_url, boards_base) = link_bases(&post.url);
    let content = rewrite_references(&post.rendered_text, &thread_url, &boards_base);

    if embed {
        let content = truncate_body(&content, CARD_TEXT_LIMIT);
        let description = format!("No. [{}]({})\n\n{}", post.number, post.url, content);
        let timestamp =
            DateTime::<Utc>::from_timestamp(post.timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH);

        Payload::card(RichCard {
            author: author_line(post),
            description,
            color: accent_color,
            timestamp,
            footer: post.format_timestamp(),
            thumbnail_url: post.media_url.clone(),
        })
    } else {
        Payload::text(truncate_body(&content, PLAIN_TEXT_LIMIT))
    }
}

/// The one-time notice for a feed whose thread was observed archived.
/// Always plain text, whatever the embed preference.
pub fn render_archival_notice(feed_name: &str) -> Payload {
    Payload::text(format!(
        "Feed `{}`: the thread has been archived and will receive no further updates.",
        feed_name
    ))
}

/// Apply the reference rewrite rules in their fixed order.
pub fn rewrite_references(text: &str, thread_url: &str, boards_base: &str) -> String {
    let text = QUOTE_RE.replace_all(text, |caps: &Captures| {
        format!("[>>{n}]({url}#p{n})", n = &caps[1], url = thread_url)
    });
    let text = CROSS_BOARD_RE.replace_all(&text, |caps: &Captures| {
        format!(
            "[>>>{b}]({base}{b}){tail}",
            b = &caps[1],
            base = boards_base,
            tail = &caps[2]
        )
    });
    let text = CROSS_THREAD_RE.replace_all(&text, |caps: &Captures| {
        format!(
            "[>>>{b}{id}]({base}{b}thread/{id})",
            b = &caps[1],
            id = &caps[2],
            base = boards_base
        )
    });
    text.into_owned()
}

/// Character-based truncation with the fixed overflow suffix. Bodies at
/// or under the overflow threshold are returned unchanged.
fn truncate_body(body: &str, limit: usize) -> String {
    if body.chars().count() <= OVERFLOW_THRESHOLD {
        return body.to_string();
    }
    let truncated: String = body.chars().take(limit).collect();
    format!("{}{}", truncated, TRUNCATION_SUFFIX)
}

fn author_line(post: &Post) -> String {
    let mut line = post.author_name.clone();
    if let Some(ref hash) = post.author_hash {
        line.push(' ');
        line.push_str(hash);
    }
    if let Some(ref sig) = post.signature {
        line.push(' ');
        line.push_str(sig);
    }
    line
}

/// Derive the same-thread link target and the board-index base from a
/// post permalink of the form `{base}/{board}/thread/{id}#p{number}`.
fn link_bases(post_url: &str) -> (String, String) {
    let thread_url = post_url.split('#').next().unwrap_or(post_url);
    let boards_base = thread_url.rsplitn(4, '/').last().unwrap_or("").to_string();
    (thread_url.to_string(), boards_base)
}
