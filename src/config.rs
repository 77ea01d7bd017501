//! Service configuration from the environment (`.env` is honoured by the binary).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_STORAGE_DIR: &str = "./data/carts";
pub const DEFAULT_STORAGE_KEY: &str = "cart";
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 900;
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub storage_dir: PathBuf,
    pub storage_key: String,
    /// Carts untouched for this long are unloaded; they reload from storage on next use.
    pub session_idle: Duration,
    /// Upper bound on carts held in memory at once.
    pub max_sessions: usize,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a non-negative number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("CART_STORAGE_KEY must not be empty")]
    EmptyStorageKey,

    #[error("CART_STORAGE_KEY may only contain letters, digits, '-' and '_', got {0:?}")]
    InvalidStorageKey(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = number(&lookup, "PORT", defaults.port)?;
        let storage_dir = lookup("CART_STORAGE_DIR").map_or(defaults.storage_dir, PathBuf::from);
        let storage_key = lookup("CART_STORAGE_KEY").map_or(defaults.storage_key, |k| k.trim().to_string());
        if storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if !storage_key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(ConfigError::InvalidStorageKey(storage_key));
        }
        let session_idle = Duration::from_secs(number(&lookup, "CART_SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?);
        let max_sessions = number(&lookup, "CART_MAX_SESSIONS", defaults.max_sessions)?;
        Ok(Self { port, storage_dir, storage_key, session_idle, max_sessions })
    }
}

fn number<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
