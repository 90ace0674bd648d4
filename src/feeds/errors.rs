use std::path::PathBuf;

use thiserror::Error;

use crate::fetcher::FetchError;
use crate::output::OutputError;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("not an rss or atom document (rss: {rss}; atom: {atom})")]
    Unrecognized {
        rss: rss::Error,
        atom: atom_syndication::Error,
    },

    #[error("reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed profile {path}")]
    Profile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("feed url for '{name}'")]
    FeedUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}
