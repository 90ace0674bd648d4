use chrono::{DateTime, Duration, FixedOffset, Utc};
use futures::stream::{self, StreamExt};
use url::Url;

use crate::feeds::errors::FeedError;
use crate::feeds::model::{FeedEntry, ParsedFeed};
use crate::feeds::parse::fetch_feed;
use crate::fetcher::Fetcher;

/// How many entries each feed contributes to the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestRules {
    pub window: Duration,
    pub per_feed_limit: usize,
    /// Taken from the top of a feed with nothing inside the window.
    pub fallback_count: usize,
}

/// Fetch every feed with at most `concurrency` requests in flight. Results
/// come back in input order.
pub async fn fetch_all(
    fetcher: &Fetcher,
    urls: &[Url],
    concurrency: usize,
) -> Vec<(Url, Result<ParsedFeed, FeedError>)> {
    stream::iter(urls.iter().cloned())
        .map(|url| async move {
            let result = fetch_feed(fetcher, &url).await;
            (url, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Entries of one feed that make it into the digest.
pub fn select_entries(feed: ParsedFeed, now: DateTime<Utc>, rules: &DigestRules) -> Vec<FeedEntry> {
    let cutoff = now - rules.window;
    let is_recent = |entry: &FeedEntry| entry.published_at.is_some_and(|at| at > cutoff);

    if feed.entries.iter().any(is_recent) {
        feed.entries
            .into_iter()
            .filter(is_recent)
            .take(rules.per_feed_limit)
            .collect()
    } else {
        feed.entries.into_iter().take(rules.fallback_count).collect()
    }
}

/// Newest first; undated entries last, in their original order.
pub fn sort_newest_first<T>(items: &mut [T], published_at: impl Fn(&T) -> Option<DateTime<FixedOffset>>) {
    items.sort_by(|a, b| published_at(b).cmp(&published_at(a)));
}

/// Merge the selected entries of every feed into one sorted digest.
pub fn build_digest(
    feeds: impl IntoIterator<Item = ParsedFeed>,
    now: DateTime<Utc>,
    rules: &DigestRules,
) -> Vec<FeedEntry> {
    let mut entries: Vec<FeedEntry> = feeds
        .into_iter()
        .flat_map(|feed| select_entries(feed, now, rules))
        .collect();
    sort_newest_first(&mut entries, |e| e.published_at);
    entries
}
