use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::BlogrollConfig;
use crate::feeds::digest::{DigestRules, build_digest, fetch_all};
use crate::feeds::errors::FeedError;
use crate::feeds::model::{DigestEntry, FeedDocument, ParsedFeed};
use crate::fetcher::{Fetcher, redacted};
use crate::output::{JsonStyle, write_json};

impl From<&BlogrollConfig> for DigestRules {
    fn from(config: &BlogrollConfig) -> Self {
        Self {
            window: Duration::days(config.window_days),
            per_feed_limit: config.per_feed_limit,
            fallback_count: config.fallback_count,
        }
    }
}

/// Fetch the configured feeds and build the digest. Feeds that fail are
/// logged and left out.
pub async fn collect(
    config: &BlogrollConfig,
    fetcher: &Fetcher,
    now: DateTime<Utc>,
) -> FeedDocument<DigestEntry> {
    let mut feeds: Vec<ParsedFeed> = Vec::with_capacity(config.feeds.len());
    for (url, result) in fetch_all(fetcher, &config.feeds, config.concurrency).await {
        match result {
            Ok(feed) => {
                info!(url = %redacted(&url), entries = feed.entries.len(), "processed feed");
                feeds.push(feed);
            }
            Err(err) => warn!(url = %redacted(&url), error = %err, "skipping feed"),
        }
    }

    let entries = build_digest(feeds, now, &DigestRules::from(config));
    info!(entries = entries.len(), "built blogroll digest");
    FeedDocument {
        feed: entries.into_iter().map(DigestEntry::from).collect(),
    }
}

pub async fn run(config: &BlogrollConfig, fetcher: &Fetcher) -> Result<FeedDocument<DigestEntry>, FeedError> {
    let document = collect(config, fetcher, Utc::now()).await;
    write_json(&config.output_path, &document, JsonStyle::TWO_SPACES).await?;
    Ok(document)
}
