//! Process configuration from the environment

use crate::runtime::RuntimeSettings;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TENANT_ID: &str = "default";
const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:3001";
const DEFAULT_REPLY_DELAY_MS: u64 = 2000;
const DEFAULT_COUNTRY_CODE: &str = "54";
const DEFAULT_CACHE_DIR: &str = ".bot_cache";
const DEFAULT_CLEANUP_RETRIES: u32 = 5;
const CLEANUP_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub port: u16,
    pub tenant_id: String,
    pub bridge_url: String,
    pub reply_delay: Duration,
    pub country_code: String,
    pub cache_dir: PathBuf,
    pub cleanup_retries: u32,
}

impl Config {
    /// Read configuration, loading `.env` first when one is present
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::info!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database_url = required("DATABASE_URL")?;
        let db_path = PathBuf::from(
            database_url
                .strip_prefix("sqlite://")
                .unwrap_or(&database_url),
        );

        let port = parse("PORT", &required("PORT")?)?;

        let reply_delay_ms = match lookup("BOT_REPLY_DELAY_MS") {
            Some(value) => parse("BOT_REPLY_DELAY_MS", &value)?,
            None => DEFAULT_REPLY_DELAY_MS,
        };
        let cleanup_retries = match lookup("BOT_CLEANUP_RETRIES") {
            Some(value) => parse("BOT_CLEANUP_RETRIES", &value)?,
            None => DEFAULT_CLEANUP_RETRIES,
        };

        let country_code = optional("BOT_COUNTRY_CODE", DEFAULT_COUNTRY_CODE);
        if !country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid {
                name: "BOT_COUNTRY_CODE",
                value: country_code,
            });
        }

        Ok(Self {
            db_path,
            port,
            tenant_id: optional("BOT_TENANT_ID", DEFAULT_TENANT_ID),
            bridge_url: optional("BOT_BRIDGE_URL", DEFAULT_BRIDGE_URL),
            reply_delay: Duration::from_millis(reply_delay_ms),
            country_code,
            cache_dir: PathBuf::from(optional("BOT_CACHE_DIR", DEFAULT_CACHE_DIR)),
            cleanup_retries,
        })
    }

    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            reply_delay: self.reply_delay,
            country_code: self.country_code.clone(),
            cache_dir: self.cache_dir.clone(),
            cleanup_retries: self.cleanup_retries,
            cleanup_delay: CLEANUP_RETRY_DELAY,
        }
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
