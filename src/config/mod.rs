use crate::error::{Result, WidgetFeedError};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub refresh_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub price_decimals: u8,
    pub gas_unit_suffix: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let refresh_interval_secs = env::var("REFRESH_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .map_err(|_| WidgetFeedError::ConfigError("Invalid REFRESH_INTERVAL_SECS".to_string()))?;

        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| WidgetFeedError::ConfigError("Invalid FETCH_TIMEOUT_SECS".to_string()))?;

        let price_decimals = env::var("PRICE_DECIMALS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u8>()
            .map_err(|_| WidgetFeedError::ConfigError("Invalid PRICE_DECIMALS".to_string()))?;

        // The display surface only ships whole-dollar and cent variants.
        if price_decimals != 0 && price_decimals != 2 {
            return Err(WidgetFeedError::ConfigError(
                "PRICE_DECIMALS must be 0 or 2".to_string(),
            ));
        }

        let gas_unit_suffix = env::var("GAS_UNIT_SUFFIX")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|_| WidgetFeedError::ConfigError("Invalid GAS_UNIT_SUFFIX".to_string()))?;

        Ok(Self {
            base_url: env::var("FEED_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            refresh_interval_secs,
            fetch_timeout_secs,
            price_decimals,
            gas_unit_suffix,
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
