use crate::api::{GasClient, PriceClient};
use crate::config::Config;
use crate::error::Result;
use crate::format::{format_gas, format_price, gas_level};
use crate::models::{DisplaySnapshot, GasSample, PriceSample, RefreshOutcome};
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Sentinel shown in place of real values when a cycle degrades. An explicit
/// "no data" marker, never an empty string.
pub const NO_DATA: &str = "—";

/// Owns the fetch-format-schedule cycle: two concurrent endpoint reads, one
/// immutable snapshot out, plus a hint for when the host should call again.
/// Stateless across calls.
pub struct RefreshPipeline {
    price_client: PriceClient,
    gas_client: GasClient,
    config: Config,
}

impl RefreshPipeline {
    pub fn new(config: Config) -> Result<Self> {
        let price_client = PriceClient::new(&config)?;
        let gas_client = GasClient::new(&config)?;

        Ok(Self {
            price_client,
            gas_client,
            config,
        })
    }

    /// Runs one refresh cycle. Never returns an error: any fetch failure
    /// (network, non-2xx, decode, timeout) collapses the whole cycle into a
    /// `Degraded` outcome carrying a placeholder snapshot. There is no
    /// partial-success path; a price without a gas value is not a snapshot.
    ///
    /// The returned instant is `now + refresh_interval` on every path. It is
    /// a scheduling hint only; the host controls the actual cadence.
    pub async fn refresh(&self, now: DateTime<Utc>) -> (RefreshOutcome, DateTime<Utc>) {
        let next_refresh_at = now + Duration::seconds(self.config.refresh_interval_secs as i64);

        let (price, gas) = tokio::join!(self.price_client.fetch(), self.gas_client.fetch());

        let outcome = match (price, gas) {
            (Ok(price), Ok(gas)) => RefreshOutcome::Success(self.build_snapshot(&price, &gas, now)),
            (price, gas) => {
                if let Err(e) = &price {
                    warn!("Price fetch failed, degrading cycle: {}", e);
                }
                if let Err(e) = &gas {
                    warn!("Gas fetch failed, degrading cycle: {}", e);
                }
                RefreshOutcome::Degraded(self.placeholder_snapshot(now))
            }
        };

        (outcome, next_refresh_at)
    }

    fn build_snapshot(
        &self,
        price: &PriceSample,
        gas: &GasSample,
        now: DateTime<Utc>,
    ) -> DisplaySnapshot {
        let mut gas_text = format_gas(gas.base_fee_gwei);
        if self.config.gas_unit_suffix {
            gas_text.push_str(" gwei");
        }

        DisplaySnapshot {
            captured_at: now,
            price_text: format_price(price.price_usd, self.config.price_decimals),
            gas_text,
            gas_gwei: gas.base_fee_gwei,
            gas_level: gas_level(gas.base_fee_gwei),
        }
    }

    fn placeholder_snapshot(&self, now: DateTime<Utc>) -> DisplaySnapshot {
        DisplaySnapshot {
            captured_at: now,
            price_text: NO_DATA.to_string(),
            gas_text: NO_DATA.to_string(),
            gas_gwei: 0.0,
            gas_level: gas_level(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_config(base_url: String) -> Config {
        Config {
            base_url,
            refresh_interval_secs: 300,
            fetch_timeout_secs: 2,
            price_decimals: 2,
            gas_unit_suffix: false,
        }
    }

    /// Minimal HTTP stub: answers /eth-price and /gas-price with the given
    /// status and JSON body, one connection per request.
    async fn spawn_stub_api(
        price: (u16, &'static str),
        gas: (u16, &'static str),
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();

                    let (status, body) = if request.starts_with("GET /eth-price") {
                        price
                    } else {
                        gas
                    };
                    let reason = if status == 200 { "OK" } else { "Error" };
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });

        format!("http://{}", addr)
    }

    const PRICE_BODY: &str = r#"{"priceUSD": 3128.66, "timestamp": 1700000000}"#;
    const GAS_BODY_LOW: &str = r#"{"gasPrice": "24000000", "gasPriceGwei": 0.024, "baseFeePerGas": "24000000", "baseFeePerGasGwei": 0.024, "timestamp": 1700000000}"#;
    const GAS_BODY_HIGH: &str = r#"{"gasPrice": "45200000000", "gasPriceGwei": 45.2, "baseFeePerGas": "45200000000", "baseFeePerGasGwei": 45.2, "timestamp": 1700000000}"#;

    #[tokio::test]
    async fn success_cycle_produces_display_snapshot() {
        let base_url = spawn_stub_api((200, PRICE_BODY), (200, GAS_BODY_LOW)).await;
        let pipeline = RefreshPipeline::new(test_config(base_url)).unwrap();

        let now = Utc::now();
        let (outcome, next_refresh_at) = pipeline.refresh(now).await;

        assert!(!outcome.is_degraded());
        let snapshot = outcome.snapshot();
        assert_eq!(snapshot.price_text, "$3,128.66");
        assert_eq!(snapshot.gas_text, "0.024");
        assert_eq!(snapshot.gas_gwei, 0.024);
        assert_eq!(snapshot.gas_level, 1);
        assert_eq!(snapshot.captured_at, now);
        assert_eq!(next_refresh_at, now + Duration::seconds(300));
    }

    #[tokio::test]
    async fn high_base_fee_is_compact_and_level_four() {
        let base_url = spawn_stub_api((200, PRICE_BODY), (200, GAS_BODY_HIGH)).await;
        let pipeline = RefreshPipeline::new(test_config(base_url)).unwrap();

        let (outcome, _) = pipeline.refresh(Utc::now()).await;

        let snapshot = outcome.snapshot();
        assert_eq!(snapshot.gas_text, "45");
        assert_eq!(snapshot.gas_level, 4);
    }

    #[tokio::test]
    async fn gas_unit_suffix_is_appended_when_configured() {
        let base_url = spawn_stub_api((200, PRICE_BODY), (200, GAS_BODY_HIGH)).await;
        let mut config = test_config(base_url);
        config.gas_unit_suffix = true;
        let pipeline = RefreshPipeline::new(config).unwrap();

        let (outcome, _) = pipeline.refresh(Utc::now()).await;

        assert_eq!(outcome.snapshot().gas_text, "45 gwei");
    }

    #[tokio::test]
    async fn whole_dollar_variant_drops_cents() {
        let base_url = spawn_stub_api((200, PRICE_BODY), (200, GAS_BODY_LOW)).await;
        let mut config = test_config(base_url);
        config.price_decimals = 0;
        let pipeline = RefreshPipeline::new(config).unwrap();

        let (outcome, _) = pipeline.refresh(Utc::now()).await;

        assert_eq!(outcome.snapshot().price_text, "$3,129");
    }

    #[tokio::test]
    async fn one_failed_endpoint_degrades_the_whole_cycle() {
        // Price succeeds, gas returns 500: no partial display.
        let base_url =
            spawn_stub_api((200, PRICE_BODY), (500, r#"{"error": "upstream down"}"#)).await;
        let pipeline = RefreshPipeline::new(test_config(base_url)).unwrap();

        let now = Utc::now();
        let (outcome, next_refresh_at) = pipeline.refresh(now).await;

        assert!(outcome.is_degraded());
        let snapshot = outcome.snapshot();
        assert_eq!(snapshot.price_text, NO_DATA);
        assert_eq!(snapshot.gas_text, NO_DATA);
        assert_eq!(snapshot.gas_gwei, 0.0);
        assert_eq!(snapshot.gas_level, 1);
        assert_eq!(snapshot.captured_at, now);
        assert_eq!(next_refresh_at, now + Duration::seconds(300));
    }

    #[tokio::test]
    async fn malformed_payload_degrades_the_cycle() {
        let base_url = spawn_stub_api((200, r#"{"price": "not the shape"}"#), (200, GAS_BODY_LOW)).await;
        let pipeline = RefreshPipeline::new(test_config(base_url)).unwrap();

        let (outcome, _) = pipeline.refresh(Utc::now()).await;

        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_the_cycle() {
        // Nothing listens on the discard port.
        let pipeline =
            RefreshPipeline::new(test_config("http://127.0.0.1:9".to_string())).unwrap();

        let (outcome, _) = pipeline.refresh(Utc::now()).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.snapshot().price_text, NO_DATA);
    }

    #[tokio::test]
    async fn hung_endpoint_resolves_within_the_fetch_timeout() {
        // Accepts connections but never responds; the request timeout must
        // convert the hang into an ordinary degraded cycle.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                    drop(socket);
                });
            }
        });

        let mut config = test_config(format!("http://{}", addr));
        config.fetch_timeout_secs = 1;
        let pipeline = RefreshPipeline::new(config).unwrap();

        let started = Instant::now();
        let (outcome, _) = pipeline.refresh(Utc::now()).await;

        assert!(outcome.is_degraded());
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
