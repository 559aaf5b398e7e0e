use tracing::debug;

use crate::{Error, Result};

/// Default rolling window cap per asset.
pub const DEFAULT_HISTORY_LIMIT: usize = 400;

/// Process configuration loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strategy config file path (TOML).
    pub strategy_config_path: String,
    /// Maximum candles kept per asset before the oldest are evicted.
    pub history_limit: usize,
    /// Capacity of the composite result channel.
    pub result_channel_capacity: usize,
    /// Optional JSON file of open positions for the position-aware strategies.
    pub positions_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy_config_path: "config/strategies.toml".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            result_channel_capacity: 128,
            positions_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    /// Loads `.env` if present. Every variable is optional, but a value that
    /// is present and unparseable is an error.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let defaults = Config::default();
        let cfg = Config {
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or(defaults.strategy_config_path),
            history_limit: parse_env("CANDLE_HISTORY_LIMIT")?.unwrap_or(defaults.history_limit),
            result_channel_capacity: parse_env("RESULT_CHANNEL_CAPACITY")?
                .unwrap_or(defaults.result_channel_capacity),
            positions_path: optional_env("OPEN_POSITIONS_PATH")
                .filter(|path| !path.trim().is_empty()),
        };

        if cfg.history_limit == 0 {
            return Err(Error::Config(
                "CANDLE_HISTORY_LIMIT must be greater than zero".to_string(),
            ));
        }
        if cfg.result_channel_capacity == 0 {
            return Err(Error::Config(
                "RESULT_CHANNEL_CAPACITY must be greater than zero".to_string(),
            ));
        }

        debug!(?cfg, "Configuration loaded");
        Ok(cfg)
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_env(key: &str) -> Result<Option<usize>> {
    match optional_env(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
            Error::Config(format!("{key} must be a positive integer, got: '{raw}'"))
        }),
    }
}
