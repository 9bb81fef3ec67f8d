use crate::config::Config;
use crate::error::{Result, WidgetFeedError};
use crate::models::GasSample;
use chrono::TimeZone;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

// The endpoint also reports gasPrice, gasPriceGwei and baseFeePerGas; only
// the base fee in gwei is consumed, so the decoder ignores the rest.
#[derive(Debug, Deserialize)]
struct GasResponse {
    #[serde(rename = "baseFeePerGasGwei")]
    base_fee_per_gas_gwei: f64,
    timestamp: i64,
}

#[derive(Clone)]
pub struct GasClient {
    client: Client,
    base_url: String,
}

impl GasClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.fetch_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub async fn fetch(&self) -> Result<GasSample> {
        let url = format!("{}/gas-price", self.base_url);

        debug!("Fetching base fee: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(WidgetFeedError::ApiError {
                status: response.status().as_u16(),
                message: format!("gas endpoint returned status: {}", response.status()),
            });
        }

        let text = response.text().await?;
        let body: std::result::Result<GasResponse, serde_json::Error> =
            serde_json::from_str(&text);
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                error!("Gas endpoint raw response: {}", text);
                return Err(WidgetFeedError::JsonError(e));
            }
        };

        if !body.base_fee_per_gas_gwei.is_finite() || body.base_fee_per_gas_gwei < 0.0 {
            return Err(WidgetFeedError::InvalidFeedData {
                message: format!("base fee out of range: {}", body.base_fee_per_gas_gwei),
            });
        }

        let observed_at = Utc
            .timestamp_opt(body.timestamp, 0)
            .single()
            .ok_or_else(|| WidgetFeedError::InvalidFeedData {
                message: format!("timestamp out of range: {}", body.timestamp),
            })?;

        info!("[GAS] base fee: {} gwei", body.base_fee_per_gas_gwei);
        Ok(GasSample {
            base_fee_gwei: body.base_fee_per_gas_gwei,
            observed_at,
        })
    }
}
