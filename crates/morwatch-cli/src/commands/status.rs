use std::sync::Arc;

use serde_json::json;

use morwatch_core::{
    compute_readiness, find_primary_provider, ApiClient, ReadinessInput, Settings,
};

use crate::cli::StatusArgs;
use crate::error::CliError;
use crate::output::{format_number, format_uptime, CommandOutput};

/// Composite status: fetches everything the dashboard front page shows and
/// reduces it to a readiness verdict. Individual fetch failures degrade to
/// missing data rather than aborting the summary.
pub async fn run(
    args: &StatusArgs,
    client: &Arc<ApiClient>,
    settings: &Settings,
) -> Result<CommandOutput, CliError> {
    let (health, balance, providers, models) = tokio::join!(
        client.get_health(),
        client.get_balance(),
        client.get_providers(),
        client.get_models(),
    );

    let first_error = health
        .as_ref()
        .err()
        .or(balance.as_ref().err())
        .or(providers.as_ref().err())
        .or(models.as_ref().err())
        .map(ToString::to_string);

    let health = health.ok().flatten();
    let balance = balance.ok();
    let providers = providers.unwrap_or_default();
    let models = models.unwrap_or_default();

    let primary = find_primary_provider(
        &providers,
        args.provider.as_deref(),
        settings.wallet_address.as_deref(),
    );
    let bids = match primary {
        Some(provider) => client
            .get_provider_bids(&provider.id)
            .await
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let details = compute_readiness(
        &ReadinessInput {
            health: health.as_ref(),
            balance: balance.as_ref(),
            providers: &providers,
            models: &models,
            bids: &bids,
            primary_provider_id: args.provider.as_deref(),
        },
        settings,
    );

    let mor = balance.as_ref().and_then(|b| b.mor.as_ref()).map(|t| t.balance);
    let mut text = format!(
        "Readiness: {} ({})\nRouter:    {}\nMOR:       {}\nProviders: {}\nModels:    {}\nBids:      {}",
        details.label,
        details.score,
        health
            .as_ref()
            .map(|h| {
                let status = h.status.as_deref().unwrap_or("unknown");
                format!("{status}, up {}", format_uptime(h.uptime_any()))
            })
            .unwrap_or_else(|| "unreachable".to_owned()),
        format_number(mor, 2),
        providers.len(),
        models.len(),
        bids.len(),
    );
    let primary_id = primary.map(|provider| provider.id.clone());
    if let Some(id) = &primary_id {
        text.push_str(&format!("\nPrimary:   {id}"));
    }
    for reason in &details.reasons {
        text.push_str(&format!("\n  ! {reason}"));
    }
    if let Some(error) = &first_error {
        text.push_str(&format!("\n  ! last error: {error}"));
    }

    let json = json!({
        "readiness": details,
        "health": health,
        "balance": balance,
        "providers": providers,
        "models": models,
        "bids": bids,
        "primary_provider_id": primary_id,
        "error": first_error,
    });

    Ok(CommandOutput::new(json, text))
}
