pub mod feed;
pub mod post;
pub mod snapshot;
pub mod thread_url;

pub use feed::{EmbedMode, FeedRecord};
pub use post::Post;
pub use snapshot::ThreadSnapshot;
pub use thread_url::ThreadUrl;
