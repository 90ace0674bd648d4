use serde::Deserialize;

use crate::books::errors::ShelfError;
use crate::books::rows::{FeedItemRow, RawRow, ShelfPage};

#[derive(Debug, Deserialize)]
struct RssDocument {
    #[serde(default)]
    channel: RssChannel,
}

#[derive(Debug, Default, Deserialize)]
struct RssChannel {
    #[serde(default, rename = "item")]
    items: Vec<FeedItemRow>,
}

/// Parse one page of the shelf RSS export. The export never states a
/// total, so paging runs until an empty page.
pub fn parse_shelf_feed(xml: &str) -> Result<ShelfPage, ShelfError> {
    let document: RssDocument = quick_xml::de::from_str(xml)?;
    Ok(ShelfPage {
        rows: document.channel.items.into_iter().map(RawRow::Feed).collect(),
        total: None,
    })
}
