use anyhow::{Context, Result};
use shelfwise::{books, config::GoodreadsConfig, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let config = GoodreadsConfig::from_env().context("load goodreads configuration")?;
    info!(user = %config.user_id, output = %config.output_dir.display(), "collecting shelves");

    let shelves = books::run(&config).await.context("collect goodreads shelves")?;
    info!(
        books = shelves.books.len(),
        bookcrossing = shelves.bookcrossing.len(),
        "done"
    );
    Ok(())
}
