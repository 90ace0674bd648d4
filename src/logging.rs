use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Install the global subscriber. `RUST_LOG` picks the filter (default
/// `info`); `LOG_FORMAT=json` switches to JSON lines. Output goes to stderr.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("build log filter")?;

    let json = std::env::var(ENV_LOG_FORMAT).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.with_target(false).try_init()
    };
    result.map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))
}
