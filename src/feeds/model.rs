use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One post from an RSS or Atom feed. Entries without a title never get
/// this far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    /// Date text as the feed wrote it.
    pub published: Option<String>,
    pub published_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// One line of the blogroll digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub title: String,
    pub link: Option<String>,
    pub published: Option<String>,
}

impl From<FeedEntry> for DigestEntry {
    fn from(entry: FeedEntry) -> Self {
        Self {
            title: entry.title,
            link: entry.link,
            published: entry.published,
        }
    }
}

/// `{"feed": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocument<T> {
    pub feed: Vec<T>,
}

/// A newsletter metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubstackProfile {
    pub subdomain: String,
    pub logo_url: Option<String>,
    pub name: String,
    pub hero_text: Option<String>,
    pub base_url: String,
}

/// Directory entry written to `blogs.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub feed_url: String,
    pub logo: Option<String>,
    pub name: String,
    pub hero_text: Option<String>,
    pub base_url: String,
}

/// Aggregated post written to `posts.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstackPost {
    pub channel_title: Option<String>,
    pub channel_url: String,
    pub channel_logo: Option<String>,
    pub title: String,
    pub url: Option<String>,
    pub published: Option<String>,
    #[serde(skip)]
    pub published_at: Option<DateTime<FixedOffset>>,
}
