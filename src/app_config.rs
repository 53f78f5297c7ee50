use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::convert::TryFrom;
use std::time::Duration;

use crate::core::summary::DEFAULT_TOP_N;
use crate::core::window::TimeWindow;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub user_id: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub default_window_days: u32,
    pub top_n: usize,
    pub snapshot_file: Option<String>,
    pub reports_dir: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Start off with default values
            .set_default("api_base_url", "http://localhost:5000/api")?
            .set_default("user_id", "")?
            .set_default("request_timeout_secs", 30)?
            .set_default("default_window_days", 7)?
            .set_default("top_n", DEFAULT_TOP_N as i64)?
            .set_default("reports_dir", "reports")?
            // Optional config file next to the binary
            .add_source(File::with_name("config").required(false))
            // Settings from environment variables (with a prefix of APP)
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        settings.try_into()
    }

    pub fn default_window(&self) -> TimeWindow {
        TimeWindow::from_days(self.default_window_days)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn optional_string(config: &Config, key: &str) -> Option<String> {
    config.get_string(key).ok().filter(|value| !value.trim().is_empty())
}

impl TryFrom<Config> for AppConfig {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        Ok(Self {
            api_base_url: config.get_string("api_base_url")?,
            user_id: config.get_string("user_id")?,
            auth_token: optional_string(&config, "auth_token"),
            request_timeout_secs: config.get_int("request_timeout_secs")? as u64,
            default_window_days: config.get_int("default_window_days")? as u32,
            top_n: config.get_int("top_n")? as usize,
            snapshot_file: optional_string(&config, "snapshot_file"),
            reports_dir: config.get_string("reports_dir")?,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            user_id: String::new(),
            auth_token: None,
            request_timeout_secs: 30,
            default_window_days: 7,
            top_n: DEFAULT_TOP_N,
            snapshot_file: None,
            reports_dir: "reports".to_string(),
        }
    }
}
