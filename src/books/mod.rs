//! Book shelf scraping: raw rows from a shelf source, extracted into
//! [`BookRecord`]s, reconciled against the owned shelf and exported.

pub mod errors;
pub mod export;
pub mod extract;
pub mod html;
pub mod model;
pub mod paginator;
pub mod pipeline;
pub mod reconcile;
pub mod rows;
pub mod rss;
pub mod source;

pub use errors::ShelfError;
pub use export::{CollectionView, export_all};
pub use model::{BookRecord, ShelfCategory};
pub use pipeline::{ShelfPipeline, Shelves, run, sort_books};
pub use source::ShelfSource;
