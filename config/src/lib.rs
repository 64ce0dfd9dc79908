#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod duration;
mod policy;

pub use app_config::{
    get_config_dir,
    AppConfig,
};
pub use args::Args;
use eyre::{
    Context as _,
    Result,
};
pub use policy::{
    RowFailurePolicy,
    SinkKind,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    path::Path,
    time::Duration,
};
use url::Url;

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub app_config: AppConfig,
    pub device: DeviceConfig,
    pub influx: InfluxConfig,
    #[serde(default, with = "duration::option", skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<Duration>,
    #[serde(default)]
    pub row_policy: RowFailurePolicy,
    #[serde(default)]
    pub sink: SinkKind,
    #[serde(default)]
    pub verbose: bool,
}

/// Where the modem lives and how to log into it.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    pub url: Url,
    pub username: String,
    pub password: String,
    #[serde(with = "duration")]
    pub timeout: Duration,
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InfluxConfig {
    pub url: Url,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(with = "duration")]
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    /// Layers the built-in defaults, `config.yaml` from the config directory and the command line.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::load(&get_config_dir(), args)
    }

    pub fn load(config_dir: &Path, args: Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let config_files = [(CONFIG_FILE, config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(self.config_dir()).context("Failed to create config directory")?;
        let path = self.config_dir().join(CONFIG_FILE);
        let content = serde_yml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).wrap_err_with(|| format!("Failed to write config to {:?}", path))?;
        info!(?path, "configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    #[test]
    fn defaults_point_at_the_stock_modem() {
        let config = Config::default();
        assert_eq!(config.device.url.as_str(), "http://192.168.42.1/");
        assert_eq!(config.device.username, "admin");
        assert_eq!(config.device.password, "admin");
        assert_eq!(config.device.timeout, Duration::from_secs(10));
        assert_eq!(config.influx.database, "electric");
        assert_eq!(config.poll_interval, None);
        assert_eq!(config.row_policy, RowFailurePolicy::Skip);
        assert_eq!(config.sink, SinkKind::Influx);
    }

    #[test]
    fn load_without_file_or_args_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path(), Args::default()).unwrap();
        let default = Config::default();
        assert_eq!(config.device, default.device);
        assert_eq!(config.influx, default.influx);
        assert_eq!(config.config_dir(), dir.path());
    }

    #[test]
    fn file_overrides_defaults_and_args_override_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "device:\n  url: http://10.0.0.1/\n  password: secret\npoll_interval: 5m\n",
        )
        .unwrap();

        let args = Args {
            username: Some("root".to_string()),
            password: Some("hunter2".to_string()),
            row_policy: Some("abort".to_string()),
            stdout: true,
            ..Default::default()
        };
        let config = Config::load(dir.path(), args).unwrap();

        assert_eq!(config.device.url.as_str(), "http://10.0.0.1/");
        assert_eq!(config.device.username, "root");
        assert_eq!(config.device.password, "hunter2");
        assert_eq!(config.device.timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Some(Duration::from_secs(300)));
        assert_eq!(config.row_policy, RowFailurePolicy::Abort);
        assert_eq!(config.sink, SinkKind::Stdout);
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let dir = TempDir::new().unwrap();
        let args = Args {
            timeout: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(Config::load(dir.path(), args).is_err());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let args = Args {
            device_url: Some("http://10.0.0.2/".to_string()),
            interval: Some("1m".to_string()),
            ..Default::default()
        };
        let config = Config::load(dir.path(), args).unwrap();
        config.save().unwrap();

        let reloaded = Config::load(dir.path(), Args::default()).unwrap();
        assert_eq!(reloaded.device, config.device);
        assert_eq!(reloaded.poll_interval, Some(Duration::from_secs(60)));
    }

    #[test]
    fn debug_output_hides_the_password() {
        let config = Config::default();
        let debug = format!("{:?}", config.device);
        assert!(debug.contains("password: \"<redacted>\""));
        assert!(!debug.contains("password: \"admin\""));
    }
}
