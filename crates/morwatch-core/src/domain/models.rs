use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Opaque pass-through of the original decoded payload.
///
/// Normalized records keep the raw object around so consumers needing
/// unmodeled upstream fields can still reach them without widening the
/// canonical schema.
pub type Metadata = serde_json::Map<String, Value>;

/// Router health report from `GET /healthcheck`.
///
/// Health needs no unit normalization, only presence handling: every field
/// is optional and decoding tolerates whatever subset the router sends.
/// Uptime may arrive under either of two names depending on the router
/// build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterHealth {
    pub status: Option<String>,
    pub version: Option<String>,
    pub uptime: Option<f64>,
    #[serde(alias = "uptimeSeconds")]
    pub uptime_seconds: Option<f64>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
}

impl RouterHealth {
    /// Uptime in seconds under whichever field name the router used.
    pub fn uptime_any(&self) -> Option<f64> {
        self.uptime.or(self.uptime_seconds)
    }
}

/// A single token position, always in whole units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub balance: f64,
}

impl TokenBalance {
    pub fn new(symbol: impl Into<String>, balance: f64) -> Self {
        Self {
            symbol: symbol.into(),
            balance,
        }
    }
}

/// Spending allowance granted to the router contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allowance {
    pub approved: bool,
    pub amount: Option<f64>,
}

/// Normalized wallet balances from `GET /blockchain/balance`.
///
/// MOR and ETH are promoted into named fields and also appear in `tokens`;
/// any further entries the router reported follow them in order. The core
/// guarantees no caller ever sees a raw wei integer here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockchainBalance {
    pub address: Option<String>,
    pub mor: Option<TokenBalance>,
    pub eth: Option<TokenBalance>,
    pub tokens: Vec<TokenBalance>,
    pub allowance: Option<Allowance>,
}

/// Normalized provider record.
///
/// `id` falls back to the address, then to the empty string; it is never
/// absent. `models` and `bids` stay `None` until a caller attaches data
/// fetched from the per-provider endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub address: String,
    pub stake: Option<f64>,
    pub status: Option<String>,
    pub is_registered: bool,
    pub active: bool,
    pub models: Option<Vec<Model>>,
    pub bids: Option<Vec<Bid>>,
    pub metadata: Metadata,
}

/// Normalized model record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub provider_id: Option<String>,
    pub stake: Option<f64>,
    pub fee_per_second: Option<f64>,
    pub price_floor: Option<f64>,
    pub tags: Vec<String>,
    pub metadata: Metadata,
}

/// Normalized bid record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub provider_id: Option<String>,
    pub model_id: Option<String>,
    pub price_per_second: Option<f64>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub metadata: Metadata,
}

/// Router configuration passthrough from the `/config` endpoint.
///
/// Only the commonly rendered fields are typed; everything else the router
/// reports is preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub network: Option<String>,
    pub mode: Option<String>,
    pub environment: Option<String>,
    #[serde(alias = "chainId")]
    pub chain_id: Option<u64>,
    pub contracts: Option<Value>,
    #[serde(flatten)]
    pub extra: Metadata,
}

/// One timestamped capture of router state produced by a poll tick.
///
/// Immutable once appended to the history buffer; a failed tick still
/// yields a snapshot carrying the first error encountered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub health: Option<RouterHealth>,
    pub balance: Option<BlockchainBalance>,
    pub providers: Option<Vec<Provider>>,
    pub models: Option<Vec<Model>>,
    pub error: Option<String>,
}

/// Composite readiness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLabel {
    Ready,
    Degraded,
    #[serde(rename = "Not Ready")]
    NotReady,
}

impl ReadinessLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Degraded => "Degraded",
            Self::NotReady => "Not Ready",
        }
    }
}

impl Display for ReadinessLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readiness score with the human-readable reasons for every failed check.
///
/// `reasons` is empty exactly when every enabled check passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessDetails {
    pub score: u8,
    pub label: ReadinessLabel,
    pub reasons: Vec<String>,
}
