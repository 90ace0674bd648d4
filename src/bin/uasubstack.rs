use anyhow::{Context, Result};
use shelfwise::{config::SubstackConfig, feeds::substack, fetcher::Fetcher, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let config = SubstackConfig::from_env().context("load substack configuration")?;
    let fetcher = Fetcher::new(&Default::default()).context("build http client")?;

    let directory = substack::run(&config, &fetcher)
        .await
        .context("build newsletter directory")?;
    info!(
        blogs = directory.blogs.len(),
        posts = directory.posts.len(),
        export = %config.export_dir.display(),
        "done"
    );
    Ok(())
}
