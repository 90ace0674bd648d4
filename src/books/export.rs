use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::books::model::BookRecord;
use crate::books::pipeline::Shelves;
use crate::output::{JsonStyle, OutputError, write_json};

/// A named subset of the collected books, written as one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionView {
    All,
    TopRated,
    CurrentlyReading,
    Bookcrossing,
}

impl CollectionView {
    pub const ALL: [CollectionView; 4] = [
        CollectionView::All,
        CollectionView::TopRated,
        CollectionView::CurrentlyReading,
        CollectionView::Bookcrossing,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::All => "read.json",
            Self::TopRated => "top_rated.json",
            Self::CurrentlyReading => "reading.json",
            Self::Bookcrossing => "bookcrossing.json",
        }
    }

    pub fn select(self, shelves: &Shelves) -> Vec<BookRecord> {
        match self {
            Self::All => shelves.books.clone(),
            Self::TopRated => shelves
                .books
                .iter()
                .filter(|b| matches!(b.rating, Some(4 | 5)))
                .cloned()
                .collect(),
            Self::CurrentlyReading => shelves
                .books
                .iter()
                .filter(|b| b.is_currently_reading)
                .cloned()
                .collect(),
            Self::Bookcrossing => shelves.bookcrossing.clone(),
        }
    }
}

/// `{"books": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooksDocument {
    pub books: Vec<BookRecord>,
}

/// Write every view into `dir`.
pub async fn export_all(shelves: &Shelves, dir: &Path) -> Result<(), OutputError> {
    for view in CollectionView::ALL {
        let document = BooksDocument {
            books: view.select(shelves),
        };
        write_json(&dir.join(view.file_name()), &document, JsonStyle::TWO_SPACES).await?;
        info!(view = view.file_name(), books = document.books.len(), "saved books");
    }
    Ok(())
}
