//! Field extraction: raw shelf rows to [`BookRecord`]s.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use url::Url;

use crate::books::model::{BookRecord, ShelfCategory};
use crate::books::rows::{FeedItemRow, HtmlRow, RawRow};
use crate::dates::{self, DateError};

static COVER_SIZE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\._S[YX]\d+(_S[YX]\d+)?_\.").expect("valid cover size regex"));

static LINE_BREAK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[\r\n]+\s*").expect("valid line break regex"));

const PLACEHOLDER_COVER_MARKER: &str = "nophoto";
const OWNED_SHELF: &str = "own";

/// What to put in `date_started` when the source only has a finish date.
///
/// The shelf RSS export has no start-date field at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartDatePolicy {
    /// Copy the finish date into the start date.
    #[default]
    MirrorFinished,
    /// Leave the start date empty.
    Absent,
}

impl FromStr for StartDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mirror-finished" => Ok(Self::MirrorFinished),
            "absent" => Ok(Self::Absent),
            other => Err(format!(
                "expected 'mirror-finished' or 'absent', got '{other}'"
            )),
        }
    }
}

/// Everything the extractor needs besides the row itself.
#[derive(Debug, Clone)]
pub struct ExtractContext {
    pub base_url: Url,
    pub category: ShelfCategory,
    pub start_date_policy: StartDatePolicy,
}

/// Turn one raw row into a book record. `None` means the row has no title.
pub fn extract(row: RawRow, ctx: &ExtractContext) -> Option<BookRecord> {
    match row {
        RawRow::Html(row) => extract_html(row, ctx),
        RawRow::Feed(row) => extract_feed(row, ctx),
    }
}

fn extract_html(row: HtmlRow, ctx: &ExtractContext) -> Option<BookRecord> {
    let title = normalize_title(row.title.as_deref()?)?;

    let date_started = row
        .date_started
        .as_deref()
        .and_then(|text| shelf_date(&title, text));
    let date_finished = row
        .date_read
        .as_deref()
        .and_then(|text| shelf_date(&title, text));

    Some(BookRecord {
        author: row.author.as_deref().and_then(normalize_author),
        cover_url: row
            .cover_src
            .as_deref()
            .and_then(non_blank)
            .map(full_size_cover),
        review_url: row
            .review_href
            .as_deref()
            .and_then(|href| absolute_url(&ctx.base_url, href)),
        rating: rating_from_stars(row.filled_stars),
        date_started,
        date_finished,
        is_currently_reading: ctx.category.is_currently_reading(),
        is_owned: ctx.category == ShelfCategory::Owned
            || row.shelves.iter().any(|s| is_owned_shelf(s)),
        title,
    })
}

fn extract_feed(row: FeedItemRow, ctx: &ExtractContext) -> Option<BookRecord> {
    let title = normalize_title(row.title.as_deref()?)?;

    let cover_url = [
        row.book_large_image_url.as_deref(),
        row.book_medium_image_url.as_deref(),
        row.book_image_url.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter_map(non_blank)
    .find(|url| !url.contains(PLACEHOLDER_COVER_MARKER))
    .map(full_size_cover);

    let review_url = row
        .link
        .as_deref()
        .and_then(non_blank)
        .map(strip_query)
        .and_then(|link| absolute_url(&ctx.base_url, link));

    let date_finished = dates::wire_date_or_absent(row.user_read_at.as_deref());
    let date_started = match ctx.start_date_policy {
        StartDatePolicy::MirrorFinished => date_finished,
        StartDatePolicy::Absent => None,
    };

    let is_owned = ctx.category == ShelfCategory::Owned
        || row
            .user_shelves
            .as_deref()
            .is_some_and(|shelves| shelves.split(',').any(is_owned_shelf));

    Some(BookRecord {
        author: row.author_name.as_deref().and_then(normalize_author),
        cover_url,
        review_url,
        rating: row.user_rating.as_deref().and_then(rating_from_text),
        date_started,
        date_finished,
        is_currently_reading: ctx.category.is_currently_reading(),
        is_owned,
        title,
    })
}

fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Trim and fold line breaks (with their indentation) into single spaces.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = non_blank(raw)?;
    Some(LINE_BREAK_REGEX.replace_all(trimmed, " ").into_owned())
}

/// `Last, First` becomes `First Last`; names without a comma are kept.
pub fn normalize_author(raw: &str) -> Option<String> {
    let trimmed = non_blank(raw)?;
    if !trimmed.contains(',') {
        return Some(trimmed.to_string());
    }

    let parts: Vec<&str> = trimmed
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .rev()
        .collect();
    Some(parts.join(" "))
}

/// Strip size modifiers such as `._SY75_` or `._SX50_SY75_` from a cover URL.
pub fn full_size_cover(url: &str) -> String {
    COVER_SIZE_REGEX.replace_all(url, ".").into_owned()
}

fn strip_query(link: &str) -> &str {
    link.split('?').next().unwrap_or(link)
}

fn absolute_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|url| url.to_string())
}

fn rating_from_stars(filled: usize) -> Option<u8> {
    u8::try_from(filled).ok().filter(|r| (1..=5).contains(r))
}

fn rating_from_text(text: &str) -> Option<u8> {
    text.trim()
        .parse::<u8>()
        .ok()
        .filter(|r| (1..=5).contains(r))
}

fn is_owned_shelf(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(OWNED_SHELF)
}

fn shelf_date(title: &str, text: &str) -> Option<chrono::NaiveDate> {
    match dates::parse_shelf_date(text) {
        Ok(date) => Some(date),
        Err(DateError::Empty) => None,
        Err(err) => {
            warn!(%title, error = %err, "ignoring unparseable shelf date");
            None
        }
    }
}
