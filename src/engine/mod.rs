pub mod diff;
pub mod dispatcher;
pub mod ops;

pub use diff::{advance_cursor, compute_delivery, Delivery};
pub use dispatcher::{Dispatcher, FeedDelivery, TickSummary};
