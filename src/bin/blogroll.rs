use anyhow::{Context, Result};
use shelfwise::{config::BlogrollConfig, feeds::blogroll, fetcher::Fetcher, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let config = BlogrollConfig::from_env().context("load blogroll configuration")?;
    let fetcher = Fetcher::new(&Default::default()).context("build http client")?;
    info!(feeds = config.feeds.len(), "building blogroll");

    let document = blogroll::run(&config, &fetcher)
        .await
        .context("build blogroll digest")?;
    info!(entries = document.feed.len(), output = %config.output_path.display(), "done");
    Ok(())
}
