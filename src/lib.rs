pub mod books;
pub mod config;
pub mod dates;
pub mod feeds;
pub mod fetcher;
pub mod logging;
pub mod output;
pub mod reeder;
