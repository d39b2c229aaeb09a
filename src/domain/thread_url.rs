use crate::app::{Result, ThreadcastError};

/// Board/thread identifier pair resolved from a feed's configured URL.
///
/// Two distinct URL strings can resolve to the same `ThreadUrl`, which is
/// why the per-tick fetch cache is keyed by this type rather than the raw
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadUrl {
    pub board: String,
    pub thread_id: String,
}

impl ThreadUrl {
    /// Split a thread URL on its last three path separators into
    /// `(board, thread_id)`.
    ///
    /// `https://boards.example.org/g/thread/12345` yields board `g` and
    /// thread `12345`. Fails when fewer than three separators exist or
    /// either captured segment is empty.
    pub fn parse(url: &str) -> Result<Self> {
        let mut parts = url.rsplitn(4, '/');
        let thread_id = parts.next().unwrap_or("");
        let _marker = parts.next();
        let board = parts.next();
        let rest = parts.next();

        let (Some(board), Some(_)) = (board, rest) else {
            return Err(ThreadcastError::MalformedUrl(url.to_string()));
        };

        if board.is_empty() || thread_id.is_empty() {
            return Err(ThreadcastError::MalformedUrl(url.to_string()));
        }

        Ok(Self {
            board: board.to_string(),
            thread_id: thread_id.to_string(),
        })
    }
}

impl std::fmt::Display for ThreadUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.board, self.thread_id)
    }
}
