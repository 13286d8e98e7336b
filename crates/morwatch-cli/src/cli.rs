//! CLI argument definitions for Morwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `status` | Composite readiness summary |
//! | `health` | Router health report |
//! | `balance` | Wallet balances in whole units |
//! | `providers` | Registered providers |
//! | `models` | Registered models |
//! | `bids` | Bids for one provider |
//! | `config` | Router (or underlying router) config |
//! | `watch` | Continuous polling with history |
//! | `router-start` | Start the local router binary |
//! | `setup` | Run the setup script |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Morwatch - dashboard CLI for a local proxy-router.
///
/// Reads settings from `MORWATCH_*` environment variables or a JSON
/// settings file, talks to the router's HTTP API, and reduces the
/// responses to normalized records and a readiness score.
#[derive(Debug, Parser)]
#[command(name = "morwatch", author, version, about = "Dashboard CLI for a local proxy-router")]
pub struct Cli {
    /// Path to a JSON settings file. Environment defaults apply otherwise.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Proxy router base URL override.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default).
    Text,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Composite readiness summary across health, balance, models, bids.
    Status(StatusArgs),
    /// Router health report.
    Health,
    /// Wallet balances, wei amounts already converted to whole units.
    Balance,
    /// Registered providers.
    Providers,
    /// Registered models.
    Models,
    /// Bids for one provider.
    Bids(BidsArgs),
    /// Router configuration passthrough.
    Config(ConfigArgs),
    /// Poll continuously and print one line per snapshot.
    Watch(WatchArgs),
    /// Start the local proxy-router binary in the background.
    RouterStart(RouterStartArgs),
    /// Run the setup script and print its output.
    Setup(SetupArgs),
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Pin the primary provider instead of matching the wallet.
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Debug, Args)]
pub struct BidsArgs {
    /// Provider id (or address) to list bids for.
    pub provider_id: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Query the underlying router's config endpoint instead.
    #[arg(long, default_value_t = false)]
    pub underlying: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll cadence override in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many snapshots (runs until interrupted otherwise).
    #[arg(long)]
    pub ticks: Option<usize>,
}

#[derive(Debug, Args)]
pub struct RouterStartArgs {
    /// Directory holding `bin/proxy-router` and the `logs/` directory.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Setup script to run.
    #[arg(long, default_value = "setup.sh")]
    pub script: PathBuf,
}
