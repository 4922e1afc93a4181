//! Handles settings for the application.
//!
//! Sources, lowest priority first: the optional TOML file
//! (`config/settings.toml` or `--config`), `HROSHI_*` environment variables
//! (`HROSHI_SERVER__PORT=9000`), then the plain `DATABASE_URL`, `BOT_TOKEN`
//! and `API_BASE_URL` variables.

use std::collections::HashMap;

use chrono_tz::Tz;
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA name, used to compute "today" in the bot.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "Europe/Kyiv".to_string(),
        }
    }
}

impl App {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|err| ConfigError::Message(format!("invalid timezone {}: {err}", self.timezone)))
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    /// Database URL, `sqlite:` or `postgres:`.
    pub database: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Server {
    /// Database URL ready for the driver. Sqlite files are created on first
    /// use.
    pub fn database_url(&self) -> String {
        let url = self.database.trim();
        let is_sqlite_file =
            url.starts_with("sqlite:") && !url.contains(":memory:") && !url.contains('?');
        if is_sqlite_file {
            format!("{url}?mode=rwc")
        } else {
            url.to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    /// A section without a token leaves the bot disabled.
    #[serde(default)]
    pub token: String,
    /// Base URL of the expenses API the bot talks to.
    #[serde(default = "default_api_url")]
    pub server: String,
}

fn default_api_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Rates {
    pub url: String,
    pub timeout_secs: u64,
    /// Skips the lookup and always uses this rate.
    pub fixed: Option<f64>,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            url: server::rates::NBU_USD_URL.to_string(),
            timeout_secs: 10,
            fixed: None,
        }
    }
}

impl Rates {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.fixed {
            Some(rate) if !(rate.is_finite() && rate > 0.0) => Err(ConfigError::Message(format!(
                "rates.fixed must be a positive number, got {rate}"
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub telegram: Option<Telegram>,
    #[serde(default)]
    pub rates: Rates,
}

#[derive(Debug, Parser)]
#[command(name = "hroshi", version)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        Self::load(config_path, std::env::vars().collect())
    }

    fn load(config_path: &str, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let plain = |name: &str| vars.get(name).cloned();

        let settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix("HROSHI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("server.database", plain("DATABASE_URL"))?
            .set_override_option("telegram.token", plain("BOT_TOKEN"))?
            .set_override_option("telegram.server", plain("API_BASE_URL"))?
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;
        if settings.telegram.as_ref().is_some_and(|t| t.token.trim().is_empty()) {
            settings.telegram = None;
        }
        settings.rates.validate()?;
        Ok(settings)
    }
}
