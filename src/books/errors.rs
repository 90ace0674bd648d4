use thiserror::Error;

use crate::books::model::ShelfCategory;
use crate::fetcher::FetchError;
use crate::output::OutputError;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("fetching shelf '{shelf}' page {page}")]
    Fetch {
        shelf: ShelfCategory,
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("building http client")]
    Client(#[source] FetchError),

    #[error("invalid shelf url")]
    Url(#[from] url::ParseError),

    #[error("malformed shelf feed")]
    Feed(#[from] quick_xml::DeError),

    #[error(transparent)]
    Output(#[from] OutputError),
}
