use anyhow::{Context, Result};
use shelfwise::{config::ReederConfig, logging, reeder};
use tokio::io::AsyncReadExt;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let config = ReederConfig::from_env();
    let mut payload = String::new();
    tokio::io::stdin()
        .read_to_string(&mut payload)
        .await
        .map_err(reeder::ReederError::from)
        .context("read payload from stdin")?;

    let document = reeder::run(&payload, &config.output_path)
        .await
        .context("reformat starred items")?;
    info!(items = document.items.len(), output = %config.output_path.display(), "done");
    Ok(())
}
