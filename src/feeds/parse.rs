use atom_syndication::Feed;
use rss::Channel;
use tracing::{debug, instrument};
use url::Url;

use crate::dates::parse_wire_timestamp;
use crate::feeds::errors::FeedError;
use crate::feeds::model::{FeedEntry, ParsedFeed};
use crate::fetcher::{Fetcher, redacted};

/// Parse an RSS 2.0 document, falling back to Atom.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed, FeedError> {
    let rss = match Channel::read_from(xml.as_bytes()) {
        Ok(channel) => return Ok(from_rss(&channel)),
        Err(err) => err,
    };
    match Feed::read_from(xml.as_bytes()) {
        Ok(feed) => Ok(from_atom(&feed)),
        Err(atom) => Err(FeedError::Unrecognized { rss, atom }),
    }
}

#[instrument(skip_all, fields(url = %redacted(url)))]
pub async fn fetch_feed(fetcher: &Fetcher, url: &Url) -> Result<ParsedFeed, FeedError> {
    let response = fetcher.fetch(url).await?;
    let mut feed = parse_feed(&response.body_utf8)?;
    resolve_links(&mut feed, &response.url_final);
    debug!(entries = feed.entries.len(), "parsed feed");
    Ok(feed)
}

/// Entry links given as paths are made absolute against the feed's own URL.
/// Absolute links are left exactly as written.
fn resolve_links(feed: &mut ParsedFeed, base: &Url) {
    for entry in &mut feed.entries {
        let Some(link) = entry.link.as_deref() else {
            continue;
        };
        if matches!(Url::parse(link), Err(url::ParseError::RelativeUrlWithoutBase))
            && let Ok(absolute) = base.join(link)
        {
            entry.link = Some(absolute.to_string());
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn from_rss(channel: &Channel) -> ParsedFeed {
    let entries = channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title().and_then(non_blank)?;
            let published = item.pub_date().and_then(non_blank);
            let published_at = published
                .as_deref()
                .and_then(|text| parse_wire_timestamp(text).ok());
            Some(FeedEntry {
                title,
                link: item.link().and_then(non_blank),
                published,
                published_at,
            })
        })
        .collect();

    ParsedFeed {
        title: non_blank(channel.title()),
        entries,
    }
}

fn from_atom(feed: &Feed) -> ParsedFeed {
    let entries = feed
        .entries()
        .iter()
        .filter_map(|entry| {
            let title = non_blank(&entry.title().value)?;
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .and_then(|l| non_blank(l.href()));
            let published_at = entry.published().copied().unwrap_or(*entry.updated());
            Some(FeedEntry {
                title,
                link,
                published: Some(published_at.to_rfc3339()),
                published_at: Some(published_at),
            })
        })
        .collect();

    ParsedFeed {
        title: non_blank(&feed.title().value),
        entries,
    }
}
