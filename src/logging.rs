use eyre::Result;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
    EnvFilter,
    Layer as _,
};

const CRATES: [&str; 4] = [
    "upc_monitor",
    "upc_monitor_config",
    "upc_monitor_scraper",
    "upc_monitor_sink",
];

pub fn init_errors() -> Result<()> {
    color_eyre::install()
}

/// Logs to stderr. `RUST_LOG` wins over the built-in filter, which is `info` for our own crates or
/// `debug` when `verbose` is set.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;
    Ok(())
}

fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
