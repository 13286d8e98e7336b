//! Composite readiness scoring over normalized router state.
//!
//! Four independently togglable checks (health, balance, model, bid) are
//! evaluated in a fixed order; only checks enabled in the settings'
//! [`ReadinessRules`] count. The score is the rounded percentage of passed
//! checks, and every failed enabled check contributes one human-readable
//! reason.

use crate::domain::{Bid, BlockchainBalance, Model, Provider, ReadinessDetails, ReadinessLabel, RouterHealth};
use crate::settings::Settings;

/// Status strings that count as healthy, compared case-insensitively.
const HEALTHY_STATUSES: &[&str] = &["ok", "healthy", "up"];

const REASON_UNHEALTHY: &str = "Router offline or unhealthy";
const REASON_LOW_BALANCE: &str = "Low MOR balance";
const REASON_NO_MODELS: &str = "No registered models";
const REASON_NO_BIDS: &str = "No active bids";

/// Everything the evaluator looks at for one verdict.
///
/// Slices may be empty when the corresponding fetch failed; the evaluator
/// treats missing data as a failed check rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessInput<'a> {
    pub health: Option<&'a RouterHealth>,
    pub balance: Option<&'a BlockchainBalance>,
    pub providers: &'a [Provider],
    pub models: &'a [Model],
    pub bids: &'a [Bid],
    pub primary_provider_id: Option<&'a str>,
}

/// Compute the composite readiness verdict for the given state.
pub fn compute_readiness(input: &ReadinessInput<'_>, settings: &Settings) -> ReadinessDetails {
    let rules = &settings.readiness_rules;
    let provider = find_primary_provider(
        input.providers,
        input.primary_provider_id,
        settings.wallet_address.as_deref(),
    );

    // Fixed check order: health, balance, model, bid.
    let mut checks: Vec<(bool, &'static str)> = Vec::with_capacity(4);

    if rules.require_health {
        checks.push((is_health_ok(input.health), REASON_UNHEALTHY));
    }

    if rules.require_balance {
        checks.push((
            is_balance_ok(input.balance, settings.min_mor_balance),
            REASON_LOW_BALANCE,
        ));
    }

    if rules.require_model {
        let ok = input.models.iter().any(|model| {
            provider.is_none()
                || model.provider_id.is_none()
                || model.provider_id.as_deref() == provider.map(|p| p.id.as_str())
        });
        checks.push((ok, REASON_NO_MODELS));
    }

    if rules.require_bid {
        let has_bids = !input.bids.is_empty()
            || provider.is_some_and(has_embedded_bids)
            || input.providers.iter().any(has_embedded_bids);
        checks.push((has_bids, REASON_NO_BIDS));
    }

    // With every rule disabled the denominator defaults to 1, keeping the
    // score defined (0, never NaN).
    let evaluated = checks.len().max(1);
    let passed = checks.iter().filter(|(ok, _)| *ok).count();
    let score = ((passed as f64 / evaluated as f64) * 100.0).round() as u8;

    let label = if score >= 90 {
        ReadinessLabel::Ready
    } else if score >= 50 {
        ReadinessLabel::Degraded
    } else {
        ReadinessLabel::NotReady
    };

    let reasons = checks
        .iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, reason)| (*reason).to_owned())
        .collect();

    ReadinessDetails {
        score,
        label,
        reasons,
    }
}

/// A health report is ok when its status matches a healthy string; with no
/// status at all, a positive uptime under either field name counts.
fn is_health_ok(health: Option<&RouterHealth>) -> bool {
    let Some(health) = health else {
        return false;
    };
    match health.status.as_deref() {
        Some(status) => HEALTHY_STATUSES
            .iter()
            .any(|candidate| status.eq_ignore_ascii_case(candidate)),
        None => health.uptime_any().unwrap_or(0.0) > 0.0,
    }
}

/// MOR balance from the named field, else the first token whose symbol is
/// "mor" case-insensitively, else zero; compared against the threshold.
fn is_balance_ok(balance: Option<&BlockchainBalance>, min_mor: f64) -> bool {
    let Some(balance) = balance else {
        return false;
    };
    let mor = balance
        .mor
        .as_ref()
        .map(|token| token.balance)
        .or_else(|| {
            balance
                .tokens
                .iter()
                .find(|token| token.symbol.eq_ignore_ascii_case("mor"))
                .map(|token| token.balance)
        })
        .unwrap_or(0.0);
    mor >= min_mor
}

/// Pick the provider representing the operator's wallet: exact id match
/// first, then a case-insensitive wallet match on address or id, then the
/// first provider in the list.
pub fn find_primary_provider<'a>(
    providers: &'a [Provider],
    primary_id: Option<&str>,
    wallet: Option<&str>,
) -> Option<&'a Provider> {
    if providers.is_empty() {
        return None;
    }
    if let Some(primary_id) = primary_id {
        if let Some(found) = providers.iter().find(|p| p.id == primary_id) {
            return Some(found);
        }
    }
    if let Some(wallet) = wallet.filter(|w| !w.is_empty()) {
        if let Some(found) = providers.iter().find(|p| {
            p.address.eq_ignore_ascii_case(wallet) || p.id.eq_ignore_ascii_case(wallet)
        }) {
            return Some(found);
        }
    }
    providers.first()
}

fn has_embedded_bids(provider: &Provider) -> bool {
    provider.bids.as_ref().is_some_and(|bids| !bids.is_empty())
}
