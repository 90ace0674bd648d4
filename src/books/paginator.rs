use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::books::errors::ShelfError;
use crate::books::extract::{ExtractContext, extract};
use crate::books::model::{BookRecord, ShelfCategory};
use crate::books::rows::{Paging, RawRow, ShelfPage};
use crate::books::source::ShelfSource;

/// Walks a shelf page by page through a [`ShelfSource`].
pub struct Paginator<'a> {
    source: &'a dyn ShelfSource,
    max_pages: u32,
    concurrency: usize,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a dyn ShelfSource, max_pages: u32, concurrency: usize) -> Self {
        Self {
            source,
            max_pages: max_pages.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// All rows of a shelf in page order.
    pub async fn fetch_rows(&self, category: ShelfCategory) -> Result<Vec<RawRow>, ShelfError> {
        match self.source.paging() {
            Paging::Counted { page_size } => self.fetch_counted(category, page_size).await,
            Paging::UntilEmpty => self.fetch_until_empty(category).await,
        }
    }

    /// All rows of a shelf, extracted, optionally dropping books with no dates.
    pub async fn fetch_books(
        &self,
        ctx: &ExtractContext,
        skip_unread: bool,
    ) -> Result<Vec<BookRecord>, ShelfError> {
        let rows = self.fetch_rows(ctx.category).await?;
        let books = rows
            .into_iter()
            .filter_map(|row| extract(row, ctx))
            .filter(|book| !skip_unread || book.has_any_date())
            .collect();
        Ok(books)
    }

    async fn fetch_counted(
        &self,
        category: ShelfCategory,
        page_size: usize,
    ) -> Result<Vec<RawRow>, ShelfError> {
        let first = self.source.fetch_page(category, 1).await?;
        if first.is_empty() {
            info!(shelf = %category, "shelf is empty");
            return Ok(Vec::new());
        }

        let advertised = match first.total {
            Some(total) => {
                let pages = total.div_ceil(page_size.max(1)).max(1);
                u32::try_from(pages).unwrap_or(u32::MAX)
            }
            None => 1,
        };
        let last_page = if advertised > self.max_pages {
            warn!(shelf = %category, advertised, cap = self.max_pages, "reached page limit, stopping");
            self.max_pages
        } else {
            advertised
        };
        info!(shelf = %category, total = ?first.total, pages = last_page, "fetching shelf");

        let rest: Vec<ShelfPage> = stream::iter(2..=last_page)
            .map(|page| self.source.fetch_page(category, page))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut rows = first.rows;
        for (offset, page) in rest.into_iter().enumerate() {
            if page.is_empty() {
                info!(shelf = %category, page = offset + 2, "no more items, stopping");
                break;
            }
            rows.extend(page.rows);
        }
        Ok(rows)
    }

    async fn fetch_until_empty(&self, category: ShelfCategory) -> Result<Vec<RawRow>, ShelfError> {
        let mut rows = Vec::new();
        let mut page = 1;

        loop {
            if page > self.max_pages {
                warn!(shelf = %category, cap = self.max_pages, "reached page limit, stopping");
                break;
            }

            info!(shelf = %category, page, "fetching shelf page");
            let fetched = self.source.fetch_page(category, page).await?;
            if fetched.is_empty() {
                info!(shelf = %category, page, "no more items, stopping");
                break;
            }

            info!(shelf = %category, page, items = fetched.rows.len(), "found items");
            rows.extend(fetched.rows);
            page += 1;
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::extract::StartDatePolicy;
    use crate::books::rows::HtmlRow;
    use crate::books::source::MockShelfSource;
    use crate::fetcher::FetchError;
    use url::Url;

    fn rows(page: u32, count: usize) -> Vec<RawRow> {
        (0..count)
            .map(|i| {
                RawRow::Html(HtmlRow {
                    title: Some(format!("Book {page}-{i}")),
                    date_read: (i % 2 == 0).then(|| "Feb 08, 2023".to_string()),
                    ..HtmlRow::default()
                })
            })
            .collect()
    }

    fn titles(rows: &[RawRow]) -> Vec<String> {
        rows.iter()
            .map(|row| match row {
                RawRow::Html(row) => row.title.clone().unwrap_or_default(),
                RawRow::Feed(row) => row.title.clone().unwrap_or_default(),
            })
            .collect()
    }

    fn counted_mock(total: Option<usize>, per_page: impl Fn(u32) -> usize + Send + 'static) -> MockShelfSource {
        let mut source = MockShelfSource::new();
        source
            .expect_paging()
            .return_const(Paging::Counted { page_size: 30 });
        source.expect_fetch_page().returning(move |_, page| {
            Ok(ShelfPage {
                rows: rows(page, per_page(page)),
                total: if page == 1 { total } else { None },
            })
        });
        source
    }

    #[tokio::test]
    async fn counted_shelf_fetches_ceil_of_total_pages() {
        let mut source = MockShelfSource::new();
        source
            .expect_paging()
            .return_const(Paging::Counted { page_size: 30 });
        source
            .expect_fetch_page()
            .times(3)
            .returning(|_, page| {
                let count = if page == 3 { 5 } else { 30 };
                Ok(ShelfPage {
                    rows: rows(page, count),
                    total: Some(65),
                })
            });

        let paginator = Paginator::new(&source, 50, 4);
        let fetched = paginator.fetch_rows(ShelfCategory::Read).await.unwrap();
        assert_eq!(fetched.len(), 65);

        let titles = titles(&fetched);
        assert_eq!(titles[0], "Book 1-0");
        assert_eq!(titles[30], "Book 2-0");
        assert_eq!(titles[64], "Book 3-4");
    }

    #[tokio::test]
    async fn counted_shelf_without_total_is_single_page() {
        let mut source = MockShelfSource::new();
        source
            .expect_paging()
            .return_const(Paging::Counted { page_size: 30 });
        source
            .expect_fetch_page()
            .times(1)
            .returning(|_, page| {
                Ok(ShelfPage {
                    rows: rows(page, 30),
                    total: None,
                })
            });

        let paginator = Paginator::new(&source, 50, 4);
        let fetched = paginator.fetch_rows(ShelfCategory::Reading).await.unwrap();
        assert_eq!(fetched.len(), 30);
    }

    #[tokio::test]
    async fn counted_shelf_stops_at_first_empty_page() {
        let source = counted_mock(Some(120), |page| if page == 3 { 0 } else { 30 });

        let paginator = Paginator::new(&source, 50, 2);
        let fetched = paginator.fetch_rows(ShelfCategory::Read).await.unwrap();
        assert_eq!(fetched.len(), 60);
        assert!(titles(&fetched).iter().all(|t| !t.starts_with("Book 4-")));
    }

    #[tokio::test]
    async fn counted_shelf_respects_page_cap() {
        let mut source = MockShelfSource::new();
        source
            .expect_paging()
            .return_const(Paging::Counted { page_size: 30 });
        source
            .expect_fetch_page()
            .times(50)
            .returning(|_, page| {
                Ok(ShelfPage {
                    rows: rows(page, 30),
                    total: Some(100_000),
                })
            });

        let paginator = Paginator::new(&source, 50, 8);
        let fetched = paginator.fetch_rows(ShelfCategory::Read).await.unwrap();
        assert_eq!(fetched.len(), 50 * 30);
    }

    #[tokio::test]
    async fn empty_first_page_stops_immediately() {
        let mut source = MockShelfSource::new();
        source
            .expect_paging()
            .return_const(Paging::Counted { page_size: 30 });
        source
            .expect_fetch_page()
            .times(1)
            .returning(|_, _| Ok(ShelfPage::default()));

        let paginator = Paginator::new(&source, 50, 4);
        assert!(paginator.fetch_rows(ShelfCategory::Owned).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn until_empty_shelf_reads_sequentially() {
        let mut source = MockShelfSource::new();
        source.expect_paging().return_const(Paging::UntilEmpty);
        source
            .expect_fetch_page()
            .times(3)
            .returning(|_, page| {
                let count = if page <= 2 { 10 } else { 0 };
                Ok(ShelfPage {
                    rows: rows(page, count),
                    total: None,
                })
            });

        let paginator = Paginator::new(&source, 50, 4);
        let fetched = paginator.fetch_rows(ShelfCategory::Read).await.unwrap();
        assert_eq!(fetched.len(), 20);
        assert_eq!(titles(&fetched)[10], "Book 2-0");
    }

    #[tokio::test]
    async fn until_empty_shelf_respects_page_cap() {
        let mut source = MockShelfSource::new();
        source.expect_paging().return_const(Paging::UntilEmpty);
        source
            .expect_fetch_page()
            .times(50)
            .returning(|_, page| {
                Ok(ShelfPage {
                    rows: rows(page, 1),
                    total: None,
                })
            });

        let paginator = Paginator::new(&source, 50, 4);
        assert_eq!(paginator.fetch_rows(ShelfCategory::Read).await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn fetch_failure_aborts() {
        let mut source = MockShelfSource::new();
        source.expect_paging().return_const(Paging::UntilEmpty);
        source.expect_fetch_page().returning(|category, page| {
            Err(ShelfError::Fetch {
                shelf: category,
                page,
                source: FetchError::RequestTimeout,
            })
        });

        let paginator = Paginator::new(&source, 50, 4);
        let err = paginator.fetch_rows(ShelfCategory::Read).await.unwrap_err();
        assert!(matches!(err, ShelfError::Fetch { page: 1, .. }));
    }

    #[tokio::test]
    async fn fetch_books_skips_unread_when_asked() {
        let mut source = MockShelfSource::new();
        source.expect_paging().return_const(Paging::Counted { page_size: 30 });
        source.expect_fetch_page().returning(|_, page| {
            Ok(ShelfPage {
                rows: rows(page, 4),
                total: None,
            })
        });

        let ctx = ExtractContext {
            base_url: Url::parse("https://www.goodreads.com").unwrap(),
            category: ShelfCategory::Read,
            start_date_policy: StartDatePolicy::MirrorFinished,
        };
        let paginator = Paginator::new(&source, 50, 4);

        let read_only = paginator.fetch_books(&ctx, true).await.unwrap();
        assert_eq!(read_only.len(), 2);
        assert!(read_only.iter().all(BookRecord::has_any_date));

        let everything = paginator.fetch_books(&ctx, false).await.unwrap();
        assert_eq!(everything.len(), 4);
    }
}
