use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::books::errors::ShelfError;
use crate::books::html::parse_shelf_page;
use crate::books::model::ShelfCategory;
use crate::books::rows::{Paging, ShelfPage};
use crate::books::rss::parse_shelf_feed;
use crate::config::{GoodreadsConfig, ShelfBackend};
use crate::fetcher::Fetcher;

/// Fetch one page of a shelf and return its raw rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShelfSource: Send + Sync {
    fn paging(&self) -> Paging;

    /// Pages are numbered from 1.
    async fn fetch_page(&self, category: ShelfCategory, page: u32)
    -> Result<ShelfPage, ShelfError>;
}

/// Pick the backend named by the configuration.
pub fn from_config(config: &GoodreadsConfig, fetcher: Fetcher) -> Box<dyn ShelfSource> {
    match &config.backend {
        ShelfBackend::Rss { key } => Box::new(RssShelfSource::new(
            fetcher,
            config.base_url.clone(),
            config.user_id.clone(),
            key.clone(),
        )),
        ShelfBackend::Html { .. } => Box::new(HtmlShelfSource::new(
            fetcher,
            config.base_url.clone(),
            config.user_id.clone(),
            config.page_size,
        )),
    }
}

/// Shelf list pages rendered as HTML tables.
pub struct HtmlShelfSource {
    fetcher: Fetcher,
    base_url: Url,
    user_id: String,
    page_size: usize,
}

impl HtmlShelfSource {
    pub fn new(fetcher: Fetcher, base_url: Url, user_id: String, page_size: usize) -> Self {
        Self {
            fetcher,
            base_url,
            user_id,
            page_size,
        }
    }

    pub fn page_url(&self, category: ShelfCategory, page: u32) -> Result<Url, ShelfError> {
        let mut url = self
            .base_url
            .join(&format!("review/list/{}", self.user_id))?;
        url.query_pairs_mut()
            .append_pair("shelf", category.slug())
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ShelfSource for HtmlShelfSource {
    fn paging(&self) -> Paging {
        Paging::Counted {
            page_size: self.page_size,
        }
    }

    async fn fetch_page(
        &self,
        category: ShelfCategory,
        page: u32,
    ) -> Result<ShelfPage, ShelfError> {
        let url = self.page_url(category, page)?;
        let response = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| ShelfError::Fetch {
                shelf: category,
                page,
                source,
            })?;

        let parsed = parse_shelf_page(&response.body_utf8);
        debug!(shelf = %category, page, rows = parsed.rows.len(), total = ?parsed.total, "parsed shelf page");
        Ok(parsed)
    }
}

/// The per-user shelf RSS export, keyed by a private feed key.
pub struct RssShelfSource {
    fetcher: Fetcher,
    base_url: Url,
    user_id: String,
    key: String,
}

impl RssShelfSource {
    pub fn new(fetcher: Fetcher, base_url: Url, user_id: String, key: String) -> Self {
        Self {
            fetcher,
            base_url,
            user_id,
            key,
        }
    }

    pub fn page_url(&self, category: ShelfCategory, page: u32) -> Result<Url, ShelfError> {
        let mut url = self
            .base_url
            .join(&format!("review/list_rss/{}", self.user_id))?;
        url.query_pairs_mut()
            .append_pair("key", &self.key)
            .append_pair("shelf", category.slug())
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ShelfSource for RssShelfSource {
    fn paging(&self) -> Paging {
        Paging::UntilEmpty
    }

    async fn fetch_page(
        &self,
        category: ShelfCategory,
        page: u32,
    ) -> Result<ShelfPage, ShelfError> {
        let url = self.page_url(category, page)?;
        let response = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| ShelfError::Fetch {
                shelf: category,
                page,
                source,
            })?;

        let parsed = parse_shelf_feed(&response.body_utf8)?;
        debug!(shelf = %category, page, rows = parsed.rows.len(), "parsed shelf feed page");
        Ok(parsed)
    }
}
