use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One tracked book for one user.
///
/// Field names on the wire follow the JSON documents the site front-end
/// already consumes (`date_read`, `is_reading_now`, `own`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub review_url: Option<String>,
    /// 1..=5, `None` when unrated.
    pub rating: Option<u8>,
    pub date_started: Option<NaiveDate>,
    #[serde(rename = "date_read")]
    pub date_finished: Option<NaiveDate>,
    #[serde(rename = "is_reading_now")]
    pub is_currently_reading: bool,
    #[serde(rename = "own", default)]
    pub is_owned: bool,
}

impl BookRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            cover_url: None,
            review_url: None,
            rating: None,
            date_started: None,
            date_finished: None,
            is_currently_reading: false,
            is_owned: false,
        }
    }

    /// Date finished, else date started.
    pub fn best_date(&self) -> Option<NaiveDate> {
        self.date_finished.or(self.date_started)
    }

    pub fn has_any_date(&self) -> bool {
        self.best_date().is_some()
    }

    /// Key used to match the same book across shelves.
    pub fn match_key(&self) -> (&str, Option<&str>) {
        (self.title.as_str(), self.author.as_deref())
    }
}

/// A named shelf on the source site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShelfCategory {
    Reading,
    Read,
    Owned,
    Bookcrossing,
}

impl ShelfCategory {
    /// Shelf name used in site URLs.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Reading => "currently-reading",
            Self::Read => "read",
            Self::Owned => "own",
            Self::Bookcrossing => "bookcrossing",
        }
    }

    /// Only the read shelf drops books that carry no dates at all.
    pub fn skips_unread(self) -> bool {
        matches!(self, Self::Read)
    }

    pub fn is_currently_reading(self) -> bool {
        matches!(self, Self::Reading)
    }
}

impl fmt::Display for ShelfCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
