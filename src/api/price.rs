use crate::config::Config;
use crate::error::{Result, WidgetFeedError};
use crate::models::PriceSample;
use chrono::TimeZone;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(rename = "priceUSD")]
    price_usd: f64,
    timestamp: i64,
}

#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base_url: String,
}

impl PriceClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.fetch_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub async fn fetch(&self) -> Result<PriceSample> {
        let url = format!("{}/eth-price", self.base_url);

        debug!("Fetching ETH/USD price: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(WidgetFeedError::ApiError {
                status: response.status().as_u16(),
                message: format!("price endpoint returned status: {}", response.status()),
            });
        }

        let text = response.text().await?;
        let body: PriceResponse = serde_json::from_str(&text)?;

        if !body.price_usd.is_finite() || body.price_usd < 0.0 {
            return Err(WidgetFeedError::InvalidFeedData {
                message: format!("price out of range: {}", body.price_usd),
            });
        }

        let observed_at = Utc
            .timestamp_opt(body.timestamp, 0)
            .single()
            .ok_or_else(|| WidgetFeedError::InvalidFeedData {
                message: format!("timestamp out of range: {}", body.timestamp),
            })?;

        info!("[PRICE] ETH/USD: ${:.2}", body.price_usd);
        Ok(PriceSample {
            price_usd: body.price_usd,
            observed_at,
        })
    }
}
