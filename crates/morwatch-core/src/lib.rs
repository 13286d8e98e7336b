//! # Morwatch Core
//!
//! Telemetry normalization and readiness engine for a locally-running
//! compute-marketplace proxy router.
//!
//! ## Overview
//!
//! The router's upstream endpoints return heterogeneous, loosely-typed
//! JSON: field names and casing disagree between builds, and token amounts
//! arrive either as wei integers or whole-unit floats. This crate ingests
//! those payloads and reduces them to a small set of strongly-typed
//! records plus a single composite readiness score:
//!
//! - **Transport** over the router HTTP API with basic auth and timeouts,
//!   failures carried as data
//! - **Normalizer** with explicit per-field alias tables and unit-scale
//!   detection
//! - **Readiness evaluator** combining the normalized state with a rule
//!   configuration into a score, label, and failure reasons
//! - **History poller** keeping a capped FIFO buffer of timestamped
//!   snapshots for trend display
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Typed client for the router endpoints |
//! | [`cache`] | TTL cache for config lookups |
//! | [`domain`] | Normalized records (health, balance, provider, model, bid) |
//! | [`error`] | API error taxonomy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Pure payload normalization |
//! | [`poller`] | Bounded continuous polling |
//! | [`process`] | Router process control |
//! | [`readiness`] | Composite readiness scoring |
//! | [`settings`] | User configuration snapshot |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use morwatch_core::{ApiClient, ReadinessInput, Settings, compute_readiness};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::from_env();
//!     let client = ApiClient::new(&settings);
//!
//!     let health = client.get_health().await.ok().flatten();
//!     let balance = client.get_balance().await.ok();
//!     let providers = client.get_providers().await.unwrap_or_default();
//!
//!     let details = compute_readiness(
//!         &ReadinessInput {
//!             health: health.as_ref(),
//!             balance: balance.as_ref(),
//!             providers: &providers,
//!             ..ReadinessInput::default()
//!         },
//!         &settings,
//!     );
//!     println!("{} ({})", details.label, details.score);
//! }
//! ```
//!
//! ## Error Handling
//!
//! Transport and normalization never panic. Calls return
//! [`ApiResult`]; a 2xx body that fails to decode degrades to absent data,
//! and malformed upstream fields degrade to absent record fields or
//! dropped list entries. The poller never terminates on a failed tick; the
//! tick still produces a snapshot carrying the error string.

pub mod api;
pub mod cache;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod poller;
pub mod process;
pub mod readiness;
pub mod settings;

pub use api::{ApiClient, RequestOptions};
pub use cache::ResponseCache;
pub use domain::{
    Allowance, Bid, BlockchainBalance, HealthSnapshot, Metadata, Model, Provider,
    ReadinessDetails, ReadinessLabel, RouterConfig, RouterHealth, TokenBalance,
};
pub use error::{ApiError, ApiResult};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
pub use normalize::{
    from_wei, normalize_balance, normalize_bid, normalize_bids, normalize_health, normalize_model,
    normalize_models, normalize_provider, normalize_providers, unwrap_array,
    WEI_HEURISTIC_THRESHOLD,
};
pub use poller::{spawn as spawn_poller, PollerHandle, HISTORY_CAPACITY};
pub use process::{run_setup, start_router, ControlOutcome, RouterPaths};
pub use readiness::{compute_readiness, find_primary_provider, ReadinessInput};
pub use settings::{
    sanitize_base_url, ReadinessRules, Settings, DEFAULT_MIN_MOR_BALANCE, DEFAULT_POLL_INTERVAL_MS,
};
