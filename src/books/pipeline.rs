use std::cmp::Ordering;

use tracing::info;
use url::Url;

use crate::books::errors::ShelfError;
use crate::books::export::export_all;
use crate::books::extract::{ExtractContext, StartDatePolicy};
use crate::books::model::{BookRecord, ShelfCategory};
use crate::books::paginator::Paginator;
use crate::books::reconcile::mark_owned;
use crate::books::source::{self, ShelfSource};
use crate::config::GoodreadsConfig;
use crate::fetcher::Fetcher;

/// Result of one run over every shelf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shelves {
    /// Reading followed by read, ownership-annotated and sorted.
    pub books: Vec<BookRecord>,
    /// The bookcrossing shelf in site order, ownership-annotated.
    pub bookcrossing: Vec<BookRecord>,
}

pub struct ShelfPipeline<'a> {
    paginator: Paginator<'a>,
    base_url: Url,
    start_date_policy: StartDatePolicy,
}

impl<'a> ShelfPipeline<'a> {
    pub fn new(source: &'a dyn ShelfSource, config: &GoodreadsConfig) -> Self {
        Self {
            paginator: Paginator::new(source, config.max_pages, config.concurrency),
            base_url: config.base_url.clone(),
            start_date_policy: config.start_date_policy,
        }
    }

    async fn shelf(&self, category: ShelfCategory) -> Result<Vec<BookRecord>, ShelfError> {
        let ctx = ExtractContext {
            base_url: self.base_url.clone(),
            category,
            start_date_policy: self.start_date_policy,
        };
        let books = self
            .paginator
            .fetch_books(&ctx, category.skips_unread())
            .await?;
        info!(shelf = %category, books = books.len(), "shelf collected");
        Ok(books)
    }

    pub async fn run(&self) -> Result<Shelves, ShelfError> {
        let mut books = self.shelf(ShelfCategory::Reading).await?;
        books.extend(self.shelf(ShelfCategory::Read).await?);

        let owned = self.shelf(ShelfCategory::Owned).await?;
        let mut bookcrossing = self.shelf(ShelfCategory::Bookcrossing).await?;

        let marked = mark_owned(&mut books, &owned);
        let marked_crossing = mark_owned(&mut bookcrossing, &owned);
        info!(marked, marked_crossing, "reconciled ownership");

        sort_books(&mut books);
        Ok(Shelves {
            books,
            bookcrossing,
        })
    }
}

/// Collect every shelf from the configured backend and write the book views
/// into the output directory.
pub async fn run(config: &GoodreadsConfig) -> Result<Shelves, ShelfError> {
    let fetcher = Fetcher::new(&config.http_settings()).map_err(ShelfError::Client)?;
    let source = source::from_config(config, fetcher);
    let shelves = ShelfPipeline::new(source.as_ref(), config).run().await?;
    export_all(&shelves, &config.output_dir).await?;
    Ok(shelves)
}

/// Currently reading first, then newest best date first. Undated books go
/// last within their group; ties keep their input order.
pub fn sort_books(books: &mut [BookRecord]) {
    books.sort_by(compare_books);
}

fn compare_books(a: &BookRecord, b: &BookRecord) -> Ordering {
    b.is_currently_reading
        .cmp(&a.is_currently_reading)
        .then_with(|| b.best_date().cmp(&a.best_date()))
}
