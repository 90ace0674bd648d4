use std::error::Error as _;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http client setup failed: {0}")]
    Client(String),

    #[error("dns or connect failure: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Classifies a reqwest failure. The request URL is stripped first since
    /// it may carry a feed key.
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() || err.is_request() {
            Self::Connect(describe(&err))
        } else {
            Self::Unknown(describe(&err))
        }
    }
}

/// The reqwest message followed by its causes, e.g. the OS connect error.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}
