//! Configuration for every entry point.
//!
//! Each binary gets one explicit configuration struct that is built once,
//! before any network call, and handed to the pipeline it drives.
//! `from_env` reads the process environment; `from_lookup` takes any
//! key-to-value function so the parsing rules can be exercised without
//! touching global state.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::books::extract::StartDatePolicy;

pub const ENV_GOODREADS_USER_ID: &str = "GOODREADS_USER_ID";
pub const ENV_GOODREADS_BASE_URL: &str = "GOODREADS_BASE_URL";
pub const ENV_GOODREADS_BACKEND: &str = "GOODREADS_BACKEND";
pub const ENV_GOODREADS_RSS_KEY: &str = "GOODREADS_RSS_KEY";
pub const ENV_GOODREADS_SESSION_COOKIE: &str = "GOODREADS_SESSION_COOKIE";
pub const ENV_GOODREADS_PAGE_SIZE: &str = "GOODREADS_PAGE_SIZE";
pub const ENV_GOODREADS_MAX_PAGES: &str = "GOODREADS_MAX_PAGES";
pub const ENV_GOODREADS_CONCURRENCY: &str = "GOODREADS_CONCURRENCY";
pub const ENV_GOODREADS_START_DATE_POLICY: &str = "GOODREADS_START_DATE_POLICY";
pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";

pub const ENV_BLOGROLL_FEEDS: &str = "BLOGROLL_FEEDS";
pub const ENV_BLOGROLL_OUTPUT: &str = "BLOGROLL_OUTPUT";
pub const ENV_BLOGROLL_WINDOW_DAYS: &str = "BLOGROLL_WINDOW_DAYS";
pub const ENV_BLOGROLL_PER_FEED_LIMIT: &str = "BLOGROLL_PER_FEED_LIMIT";
pub const ENV_BLOGROLL_FALLBACK_COUNT: &str = "BLOGROLL_FALLBACK_COUNT";
pub const ENV_BLOGROLL_CONCURRENCY: &str = "BLOGROLL_CONCURRENCY";

pub const ENV_SUBSTACK_METADATA_DIR: &str = "SUBSTACK_METADATA_DIR";
pub const ENV_SUBSTACK_EXPORT_DIR: &str = "SUBSTACK_EXPORT_DIR";
pub const ENV_SUBSTACK_PER_FEED_LIMIT: &str = "SUBSTACK_PER_FEED_LIMIT";
pub const ENV_SUBSTACK_CONCURRENCY: &str = "SUBSTACK_CONCURRENCY";
pub const ENV_SUBSTACK_FEED_URL_TEMPLATE: &str = "SUBSTACK_FEED_URL_TEMPLATE";

pub const ENV_REEDER_OUTPUT: &str = "REEDER_OUTPUT";

const DEFAULT_GOODREADS_USER_ID: &str = "18740796";
const DEFAULT_GOODREADS_BASE_URL: &str = "https://www.goodreads.com";
const DEFAULT_PAGE_SIZE: usize = 30;
const DEFAULT_MAX_PAGES: u32 = 50;
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_OUTPUT_DIR: &str = "data";

const DEFAULT_BLOGROLL_OUTPUT: &str = "data/blogroll.json";
const DEFAULT_WINDOW_DAYS: i64 = 30;
const DEFAULT_PER_FEED_LIMIT: usize = 10;
const DEFAULT_FALLBACK_COUNT: usize = 3;

const DEFAULT_SUBSTACK_METADATA_DIR: &str = "substacks";
const DEFAULT_SUBSTACK_EXPORT_DIR: &str = "export";
const DEFAULT_SUBSTACK_FEED_URL_TEMPLATE: &str = "https://{subdomain}.substack.com/feed/";
pub const SUBDOMAIN_PLACEHOLDER: &str = "{subdomain}";

const DEFAULT_REEDER_OUTPUT: &str = "reeder-starred-items.json";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_BLOGROLL_FEEDS: &[&str] = &[
    "https://sinja.io/rss",
    "https://mrgall.com/feed/",
    "https://www.govorukhin.com/blog/rss.xml",
    "https://poohitan.com/rss",
    "https://zemlan.in/rss.xml",
    "https://ciechanow.ski/atom.xml",
    "https://toytakeorg.substack.com/feed/",
    "https://7uapoems.substack.com/feed/",
    "https://blnk.substack.com/feed/",
    "https://zametkin.me/feed/",
    "https://blog.alexkolodko.com/rss/",
    "https://world.hey.com/dhh/feed.atom",
    "https://world.hey.com/jason/feed.atom",
    "https://moretothat.com/feed/",
    "https://www.autodidacts.io/rss/",
    "https://snyder.substack.com/feed",
    "https://waitbutwhy.com/feed",
    "https://reporters.media/feed/",
    "https://zaytsev.io/blog/rss/",
    "https://www.the-next.me/rss/",
    "https://zverok.space/feed.xml",
    "https://paulstamatiou.com/posts.xml",
    "https://www.julian.digital/feed",
    "https://chrisnicholas.dev/rss.xml",
    "https://oykun.com/rss/",
    "https://vanschneider.com/blog/rss/",
    "https://media3.substack.com/feed/",
    "https://tlfrd.substack.com/feed/",
];

/// Errors that can occur while building a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {var}")]
    Missing { var: &'static str },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Settings for the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub user_agent: String,
    pub cookie: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookie: None,
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Which shelf source the book scraper reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfBackend {
    /// The per-user RSS export, authenticated by a feed key.
    Rss { key: String },
    /// The public shelf HTML pages, optionally with a session cookie.
    Html { session_cookie: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodreadsConfig {
    pub user_id: String,
    pub base_url: Url,
    pub backend: ShelfBackend,
    pub page_size: usize,
    pub max_pages: u32,
    pub concurrency: usize,
    pub start_date_policy: StartDatePolicy,
    pub output_dir: PathBuf,
}

impl GoodreadsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_id = value(&lookup, ENV_GOODREADS_USER_ID)
            .unwrap_or_else(|| DEFAULT_GOODREADS_USER_ID.to_string());
        let base_url = parse_base_url(
            ENV_GOODREADS_BASE_URL,
            &value(&lookup, ENV_GOODREADS_BASE_URL)
                .unwrap_or_else(|| DEFAULT_GOODREADS_BASE_URL.to_string()),
        )?;

        let backend = match value(&lookup, ENV_GOODREADS_BACKEND)
            .as_deref()
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            None | Some("rss") => {
                let key = value(&lookup, ENV_GOODREADS_RSS_KEY).ok_or(ConfigError::Missing {
                    var: ENV_GOODREADS_RSS_KEY,
                })?;
                ShelfBackend::Rss { key }
            }
            Some("html") => ShelfBackend::Html {
                session_cookie: value(&lookup, ENV_GOODREADS_SESSION_COOKIE),
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: ENV_GOODREADS_BACKEND,
                    reason: format!("expected 'rss' or 'html', got '{other}'"),
                });
            }
        };

        let start_date_policy = match value(&lookup, ENV_GOODREADS_START_DATE_POLICY) {
            None => StartDatePolicy::MirrorFinished,
            Some(raw) => raw
                .parse()
                .map_err(|reason: String| ConfigError::InvalidValue {
                    field: ENV_GOODREADS_START_DATE_POLICY,
                    reason,
                })?,
        };

        Ok(Self {
            user_id,
            base_url,
            backend,
            page_size: positive(&lookup, ENV_GOODREADS_PAGE_SIZE, DEFAULT_PAGE_SIZE)?,
            max_pages: positive(&lookup, ENV_GOODREADS_MAX_PAGES, DEFAULT_MAX_PAGES)?,
            concurrency: positive(&lookup, ENV_GOODREADS_CONCURRENCY, DEFAULT_CONCURRENCY)?,
            start_date_policy,
            output_dir: value(&lookup, ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        })
    }

    pub fn http_settings(&self) -> HttpSettings {
        let cookie = match &self.backend {
            ShelfBackend::Html { session_cookie } => session_cookie.clone(),
            ShelfBackend::Rss { .. } => None,
        };
        HttpSettings {
            cookie,
            ..HttpSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogrollConfig {
    pub feeds: Vec<Url>,
    pub output_path: PathBuf,
    pub window_days: i64,
    pub per_feed_limit: usize,
    pub fallback_count: usize,
    pub concurrency: usize,
}

impl BlogrollConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feeds = match value(&lookup, ENV_BLOGROLL_FEEDS) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_url(ENV_BLOGROLL_FEEDS, s))
                .collect::<Result<Vec<_>, _>>()?,
            None => DEFAULT_BLOGROLL_FEEDS
                .iter()
                .map(|s| parse_url(ENV_BLOGROLL_FEEDS, s))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self {
            feeds,
            output_path: value(&lookup, ENV_BLOGROLL_OUTPUT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOGROLL_OUTPUT)),
            window_days: positive(&lookup, ENV_BLOGROLL_WINDOW_DAYS, DEFAULT_WINDOW_DAYS)?,
            per_feed_limit: positive(&lookup, ENV_BLOGROLL_PER_FEED_LIMIT, DEFAULT_PER_FEED_LIMIT)?,
            fallback_count: parse_or(&lookup, ENV_BLOGROLL_FALLBACK_COUNT, DEFAULT_FALLBACK_COUNT)?,
            concurrency: positive(&lookup, ENV_BLOGROLL_CONCURRENCY, DEFAULT_CONCURRENCY)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstackConfig {
    pub metadata_dir: PathBuf,
    pub export_dir: PathBuf,
    pub per_feed_limit: usize,
    pub concurrency: usize,
    /// Feed URL with `{subdomain}` standing in for the profile subdomain.
    pub feed_url_template: String,
}

impl SubstackConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feed_url_template = value(&lookup, ENV_SUBSTACK_FEED_URL_TEMPLATE)
            .unwrap_or_else(|| DEFAULT_SUBSTACK_FEED_URL_TEMPLATE.to_string());
        if !feed_url_template.contains(SUBDOMAIN_PLACEHOLDER) {
            return Err(ConfigError::InvalidValue {
                field: ENV_SUBSTACK_FEED_URL_TEMPLATE,
                reason: format!("must contain {SUBDOMAIN_PLACEHOLDER}"),
            });
        }

        Ok(Self {
            metadata_dir: value(&lookup, ENV_SUBSTACK_METADATA_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUBSTACK_METADATA_DIR)),
            export_dir: value(&lookup, ENV_SUBSTACK_EXPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUBSTACK_EXPORT_DIR)),
            per_feed_limit: positive(&lookup, ENV_SUBSTACK_PER_FEED_LIMIT, DEFAULT_PER_FEED_LIMIT)?,
            concurrency: positive(&lookup, ENV_SUBSTACK_CONCURRENCY, DEFAULT_CONCURRENCY)?,
            feed_url_template,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReederConfig {
    pub output_path: PathBuf,
}

impl ReederConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            output_path: value(&lookup, ENV_REEDER_OUTPUT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REEDER_OUTPUT)),
        }
    }
}

/// A set, non-blank variable, trimmed.
fn value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: format!("'{raw}' is not a url: {e}"),
    })
}

/// A url that relative paths are joined onto. The path gets a trailing `/`
/// so `join` keeps its last segment.
fn parse_base_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = parse_url(field, raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match value(lookup, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: format!("'{raw}': {e}"),
        }),
    }
}

fn positive<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let parsed = parse_or(lookup, key, default)?;
    if parsed <= T::default() {
        return Err(ConfigError::InvalidValue {
            field: key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}
