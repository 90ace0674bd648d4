//! Typed raw rows, one shape per shelf source, before field extraction.

use serde::Deserialize;

/// One `<tr>` of a shelf table, with text already pulled out of the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlRow {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_src: Option<String>,
    pub filled_stars: usize,
    pub date_started: Option<String>,
    pub date_read: Option<String>,
    pub review_href: Option<String>,
    pub shelves: Vec<String>,
}

/// One `<item>` of the per-user shelf RSS export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedItemRow {
    pub title: Option<String>,
    pub link: Option<String>,
    pub author_name: Option<String>,
    pub book_image_url: Option<String>,
    pub book_medium_image_url: Option<String>,
    pub book_large_image_url: Option<String>,
    pub user_rating: Option<String>,
    pub user_read_at: Option<String>,
    pub user_shelves: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRow {
    Html(HtmlRow),
    Feed(FeedItemRow),
}

/// Rows found on one page, plus the shelf size when the page states it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShelfPage {
    pub rows: Vec<RawRow>,
    pub total: Option<usize>,
}

impl ShelfPage {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How a source tells the paginator where the shelf ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// Page 1 reports the item total; no total means a single page.
    Counted { page_size: usize },
    /// Keep requesting pages until one comes back empty.
    UntilEmpty,
}
