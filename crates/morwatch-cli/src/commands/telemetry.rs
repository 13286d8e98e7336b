use std::sync::Arc;

use serde_json::json;

use morwatch_core::ApiClient;

use crate::cli::{BidsArgs, ConfigArgs};
use crate::error::CliError;
use crate::output::{format_address, format_number, format_uptime, CommandOutput};

pub async fn health(client: &Arc<ApiClient>) -> Result<CommandOutput, CliError> {
    let health = client.get_health().await?;
    let text = match &health {
        Some(health) => {
            let mut lines = vec![format!(
                "status:  {}",
                health.status.as_deref().unwrap_or("unknown")
            )];
            if let Some(version) = &health.version {
                lines.push(format!("version: {version}"));
            }
            lines.push(format!("uptime:  {}", format_uptime(health.uptime_any())));
            if let Some(message) = &health.message {
                lines.push(format!("message: {message}"));
            }
            lines.join("\n")
        }
        None => "no health report".to_owned(),
    };
    Ok(CommandOutput::new(json!(health), text))
}

pub async fn balance(client: &Arc<ApiClient>) -> Result<CommandOutput, CliError> {
    let balance = client.get_balance().await?;
    let mut lines = vec![format!(
        "wallet: {}",
        format_address(balance.address.as_deref())
    )];
    for token in &balance.tokens {
        lines.push(format!(
            "{:>6}: {}",
            token.symbol,
            format_number(Some(token.balance), 4)
        ));
    }
    if let Some(allowance) = &balance.allowance {
        lines.push(format!(
            "allowance: {} ({})",
            format_number(allowance.amount, 4),
            if allowance.approved { "approved" } else { "not approved" }
        ));
    }
    Ok(CommandOutput::new(json!(balance), lines.join("\n")))
}

pub async fn providers(client: &Arc<ApiClient>) -> Result<CommandOutput, CliError> {
    let providers = client.get_providers().await?;
    let text = if providers.is_empty() {
        "no providers registered".to_owned()
    } else {
        providers
            .iter()
            .map(|p| {
                format!(
                    "{}  {}  stake={}  {}{}",
                    p.id,
                    format_address(Some(p.address.as_str())),
                    format_number(p.stake, 2),
                    p.status.as_deref().unwrap_or("unknown"),
                    if p.is_registered { "" } else { "  (unregistered)" },
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    Ok(CommandOutput::new(json!(providers), text))
}

pub async fn models(client: &Arc<ApiClient>) -> Result<CommandOutput, CliError> {
    let models = client.get_models().await?;
    let text = if models.is_empty() {
        "no models registered".to_owned()
    } else {
        models
            .iter()
            .map(|m| {
                format!(
                    "{}  provider={}  fee/s={}  tags=[{}]",
                    m.id,
                    m.provider_id.as_deref().unwrap_or("-"),
                    format_number(m.fee_per_second, 6),
                    m.tags.join(", "),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    Ok(CommandOutput::new(json!(models), text))
}

pub async fn bids(args: &BidsArgs, client: &Arc<ApiClient>) -> Result<CommandOutput, CliError> {
    let bids = client.get_provider_bids(&args.provider_id).await?;
    let text = if bids.is_empty() {
        format!("no bids for provider {}", args.provider_id)
    } else {
        bids.iter()
            .map(|b| {
                format!(
                    "{}  model={}  price/s={}  {}",
                    b.id,
                    b.model_id.as_deref().unwrap_or("-"),
                    format_number(b.price_per_second, 6),
                    b.status.as_deref().unwrap_or("unknown"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    Ok(CommandOutput::new(json!(bids), text))
}

pub async fn config(args: &ConfigArgs, client: &Arc<ApiClient>) -> Result<CommandOutput, CliError> {
    if args.underlying {
        let config = client.get_underlying_config().await?;
        let text = match &config {
            Some(value) => serde_json::to_string_pretty(value)?,
            None => "no config returned".to_owned(),
        };
        return Ok(CommandOutput::new(json!(config), text));
    }

    let config = client.get_config().await?;
    let text = match &config {
        Some(config) => serde_json::to_string_pretty(config)?,
        None => "no config returned".to_owned(),
    };
    Ok(CommandOutput::new(json!(config), text))
}
