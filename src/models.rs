use chrono::{DateTime, Utc};
use serde::Serialize;

/// One parsed observation from the price endpoint. Immutable once built.
#[derive(Debug, Clone)]
pub struct PriceSample {
    pub price_usd: f64,
    pub observed_at: DateTime<Utc>,
}

/// One parsed observation from the gas endpoint. Immutable once built.
#[derive(Debug, Clone)]
pub struct GasSample {
    pub base_fee_gwei: f64,
    pub observed_at: DateTime<Utc>,
}

/// The unit handed to the display surface. One snapshot exists per refresh
/// cycle; it supersedes the previous one and keeps no history.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySnapshot {
    pub captured_at: DateTime<Utc>,
    pub price_text: String,
    pub gas_text: String,
    pub gas_gwei: f64,
    pub gas_level: u8,
}

/// A refresh cycle is all-or-nothing: either both fetches produced a real
/// snapshot, or the cycle degrades to a placeholder one. The display surface
/// always receives something renderable.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Success(DisplaySnapshot),
    Degraded(DisplaySnapshot),
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> &DisplaySnapshot {
        match self {
            RefreshOutcome::Success(snapshot) => snapshot,
            RefreshOutcome::Degraded(snapshot) => snapshot,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RefreshOutcome::Degraded(_))
    }
}
