//! User configuration snapshot consumed by the core.
//!
//! The core never mutates settings; the surrounding application owns them
//! and hands a snapshot to each call. Defaults come from `MORWATCH_*`
//! environment variables with unprefixed fallbacks.

use std::env;

use serde::{Deserialize, Serialize};

/// Default poll cadence for the history poller.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 15_000;
/// Default minimum MOR balance for the balance readiness rule.
pub const DEFAULT_MIN_MOR_BALANCE: f64 = 1.0;
const DEFAULT_BASE_URL: &str = "http://localhost:8082";
const DEFAULT_UNDERLYING_CONFIG_URL: &str = "http://localhost:8080/config";

/// Independently togglable readiness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessRules {
    pub require_health: bool,
    pub require_balance: bool,
    pub require_model: bool,
    pub require_bid: bool,
}

impl Default for ReadinessRules {
    fn default() -> Self {
        Self {
            require_health: true,
            require_balance: true,
            require_model: true,
            require_bid: true,
        }
    }
}

impl ReadinessRules {
    /// Rules with every check disabled.
    pub const fn none() -> Self {
        Self {
            require_health: false,
            require_balance: false,
            require_model: false,
            require_bid: false,
        }
    }
}

/// Snapshot of the user-facing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Proxy router base URL, stored without trailing slashes.
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub wallet_address: Option<String>,
    pub min_mor_balance: f64,
    /// Explicit `/config` endpoint override.
    pub config_url: Option<String>,
    /// Explicit underlying-router config endpoint override.
    pub underlying_config_url: Option<String>,
    pub readiness_rules: ReadinessRules,
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            username: None,
            password: None,
            wallet_address: None,
            min_mor_balance: DEFAULT_MIN_MOR_BALANCE,
            config_url: None,
            underlying_config_url: Some(DEFAULT_UNDERLYING_CONFIG_URL.to_owned()),
            readiness_rules: ReadinessRules::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to defaults.
    ///
    /// Each value is read from `MORWATCH_<NAME>` first and the unprefixed
    /// `<NAME>` second.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: sanitize_base_url(
                &env_string("API_BASE").unwrap_or(defaults.base_url),
            ),
            username: env_string("USERNAME"),
            password: env_string("PASSWORD"),
            wallet_address: env_string("WALLET_ADDRESS"),
            min_mor_balance: env_number("MIN_MOR_BALANCE", defaults.min_mor_balance),
            config_url: env_string("CONFIG_URL"),
            underlying_config_url: env_string("UNDERLYING_CONFIG_URL")
                .or(defaults.underlying_config_url),
            readiness_rules: ReadinessRules::default(),
            poll_interval_ms: env_number("POLL_INTERVAL_MS", defaults.poll_interval_ms as f64)
                .max(0.0) as u64,
        }
    }

    /// Basic-auth credentials, when a username is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| (name, self.password.as_deref().unwrap_or("")))
    }
}

/// Strip whitespace and trailing slashes from a configured base URL.
pub fn sanitize_base_url(url: &str) -> String {
    let compact: String = url.chars().filter(|ch| !ch.is_whitespace()).collect();
    compact.trim_end_matches('/').to_owned()
}

fn env_string(name: &str) -> Option<String> {
    let prefixed = format!("MORWATCH_{name}");
    env::var(&prefixed)
        .or_else(|_| env::var(name))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn env_number(name: &str, fallback: f64) -> f64 {
    env_string(name)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(fallback)
}
