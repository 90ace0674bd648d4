use crate::config::HttpSettings;
use crate::fetcher::{
    errors::FetchError,
    pipeline::{is_supported_content_type, process_response},
    types::PageResponse,
};
use reqwest::{
    Client, ClientBuilder,
    header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue},
};
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: u64 = 10 * 1024 * 1024; // 10MB
const SECRET_QUERY_KEYS: &[&str] = &["key", "token"];
const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/rss+xml,application/atom+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP client shared by every scraper. Built once per run from settings.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        if let Some(cookie) = settings.cookie.as_deref() {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|e| FetchError::Client(format!("invalid cookie header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = ClientBuilder::new()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    #[instrument(skip_all, fields(url = %redacted(url)))]
    pub async fn fetch(&self, url: &Url) -> Result<PageResponse, FetchError> {
        debug!("sending request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !is_supported_content_type(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.without_url().to_string()))?;

        // Content-Length may be missing or wrong
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        let page = process_response(final_url, &body_bytes, &content_type)?;
        debug!(
            status = %status,
            bytes = body_bytes.len(),
            charset = ?page.charset,
            "received response"
        );
        Ok(page)
    }
}

/// The URL with credential-bearing query values masked, for logs.
pub fn redacted(url: &Url) -> Url {
    if !url
        .query_pairs()
        .any(|(k, _)| SECRET_QUERY_KEYS.contains(&&*k))
    {
        return url.clone();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if SECRET_QUERY_KEYS.contains(&&*k) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked
}
