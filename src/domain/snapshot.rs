use crate::domain::post::Post;

/// Point-in-time view of one thread, the result of a single Source fetch.
///
/// Lives for one tick and is shared between every feed that resolves to
/// the same `(board, thread_id)`; it is never persisted.
#[derive(Debug, Clone)]
pub struct ThreadSnapshot {
    pub board: String,
    pub thread_id: String,
    pub topic: Post,
    /// Replies oldest to newest; post numbers are strictly increasing.
    pub replies: Vec<Post>,
    /// Number of the newest reply, or of the topic when there are none.
    pub last_reply_id: u64,
    pub archived: bool,
    pub sticky: bool,
    pub bump_limit: bool,
    pub image_count: u64,
}

impl ThreadSnapshot {
    pub fn reply_count(&self) -> u64 {
        self.replies.len() as u64
    }

    /// The newest deliverable item: the most recent reply, or the topic
    /// for a thread with no replies yet.
    pub fn latest_item(&self) -> &Post {
        self.replies.last().unwrap_or(&self.topic)
    }

    /// Replies strictly newer than `last_post_id`, oldest first.
    pub fn replies_after(&self, last_post_id: u64) -> impl Iterator<Item = &Post> {
        self.replies.iter().filter(move |r| r.number > last_post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(number: u64) -> Post {
        Post {
            number,
            timestamp: 1_700_000_000 + number as i64,
            author_name: "Anonymous".into(),
            author_hash: None,
            signature: None,
            raw_text: String::new(),
            rendered_text: format!("reply {}", number),
            url: format!("https://boards.example.org/g/thread/100#p{}", number),
            media_url: None,
        }
    }

    fn snapshot(replies: &[u64]) -> ThreadSnapshot {
        let replies: Vec<Post> = replies.iter().map(|n| post(*n)).collect();
        let last_reply_id = replies.last().map(|p| p.number).unwrap_or(100);
        ThreadSnapshot {
            board: "g".into(),
            thread_id: "100".into(),
            topic: post(100),
            replies,
            last_reply_id,
            archived: false,
            sticky: false,
            bump_limit: false,
            image_count: 0,
        }
    }

    #[test]
    fn test_latest_item_is_newest_reply() {
        let snap = snapshot(&[101, 102, 103]);
        assert_eq!(snap.latest_item().number, 103);
    }

    #[test]
    fn test_latest_item_falls_back_to_topic() {
        let snap = snapshot(&[]);
        assert_eq!(snap.latest_item().number, 100);
    }

    #[test]
    fn test_replies_after() {
        let snap = snapshot(&[101, 102, 103, 104]);
        let numbers: Vec<u64> = snap.replies_after(102).map(|p| p.number).collect();
        assert_eq!(numbers, vec![103, 104]);
    }

    #[test]
    fn test_replies_after_none_newer() {
        let snap = snapshot(&[101, 102]);
        assert_eq!(snap.replies_after(102).count(), 0);
    }
}
