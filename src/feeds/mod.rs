//! RSS and Atom digests: the blogroll and the newsletter directory.

pub mod blogroll;
pub mod digest;
pub mod errors;
pub mod model;
pub mod parse;
pub mod substack;

pub use errors::FeedError;
pub use model::{FeedDocument, FeedEntry, ParsedFeed};
pub use parse::{fetch_feed, parse_feed};
