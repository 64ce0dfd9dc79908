use clap::Parser;

/// Scrapes the channel diagnostics of a UPC cable modem and writes them to InfluxDB.
#[derive(Parser, Debug, Clone, Default)]
#[command(version = version(), about, long_about = None)]
pub struct Args {
    /// Base URL of the modem's web interface.
    #[clap(long, value_name = "URL", env = "UPC_MONITOR_DEVICE_URL")]
    pub device_url: Option<String>,

    /// Login name for the modem's web interface.
    #[clap(long, value_name = "NAME", env = "UPC_MONITOR_USERNAME")]
    pub username: Option<String>,

    /// Password for the modem's web interface.
    #[clap(long, value_name = "PASSWORD", env = "UPC_MONITOR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Timeout applied to every request against the modem (e.g. `10s`).
    #[clap(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// InfluxDB base URL.
    #[clap(long, value_name = "URL", env = "UPC_MONITOR_INFLUX_URL")]
    pub influx_url: Option<String>,

    /// InfluxDB database the points are written to.
    #[clap(long, value_name = "NAME", env = "UPC_MONITOR_INFLUX_DATABASE")]
    pub database: Option<String>,

    /// Poll continuously, waiting this long between the start of two cycles (e.g. `5m`).
    /// Without it a single cycle is run.
    #[clap(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// What to do with table rows that cannot be parsed: `skip` or `abort`.
    #[clap(long, value_name = "POLICY")]
    pub row_policy: Option<String>,

    /// Print line protocol to stdout instead of writing to InfluxDB.
    #[clap(long, action)]
    pub stdout: bool,

    /// Persist the effective configuration to the config directory.
    #[clap(long, action)]
    pub save_config: bool,

    /// Enables debug logging.
    #[clap(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            let options = [
                ("device.url", &self.device_url),
                ("device.username", &self.username),
                ("device.password", &self.password),
                ("device.timeout", &self.timeout),
                ("influx.url", &self.influx_url),
                ("influx.database", &self.database),
                ("poll_interval", &self.interval),
                ("row_policy", &self.row_policy),
            ];
            for (key, value) in options {
                if let Some(value) = value {
                    cache.insert(key.to_string(), value.clone().into());
                }
            }
            if self.stdout {
                cache.insert("sink".to_string(), "stdout".into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!("{}\n\nConfig directory: {config_dir_path}", clap::crate_version!())
}
