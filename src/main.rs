use clap::Parser;
use color_eyre::Result;
use eyre::Context as _;
use upc_monitor::{
    init_errors,
    init_logging,
    App,
};
use upc_monitor_config::{
    Args,
    Config,
};

fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    let save_config = args.save_config;
    let config = Config::new(args).wrap_err("Failed to load configuration")?;
    init_logging(config.verbose)?;

    if save_config {
        config.save()?;
    }

    App::new(&config)?.run()
}
