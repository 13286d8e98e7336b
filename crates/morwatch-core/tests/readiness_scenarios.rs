//! End-to-end readiness scenarios: raw payloads through the normalizer
//! into the evaluator.

use serde_json::json;

use morwatch_core::{
    compute_readiness, normalize_balance, normalize_bids, normalize_health, normalize_models,
    normalize_providers, ReadinessInput, ReadinessLabel, Settings,
};

#[test]
fn fully_provisioned_operator_is_ready() {
    let settings = Settings {
        wallet_address: Some("0xAA".to_owned()),
        min_mor_balance: 1.0,
        ..Settings::default()
    };

    let health = normalize_health(Some(&json!({ "status": "ok" }))).expect("decodes");
    let balance = normalize_balance(Some(&json!({ "MOR": "5000000000000000000" })));
    let providers = normalize_providers(Some(&json!([
        { "Id": "p-1", "Address": "0xaa" }
    ])));
    let models = normalize_models(Some(&json!([
        { "id": "m-1", "providerId": "p-1" }
    ])));
    let bids = normalize_bids(Some(&json!([
        { "id": "b-1", "providerId": "p-1" }
    ])));

    let details = compute_readiness(
        &ReadinessInput {
            health: Some(&health),
            balance: Some(&balance),
            providers: &providers,
            models: &models,
            bids: &bids,
            primary_provider_id: None,
        },
        &settings,
    );

    assert_eq!(details.score, 100);
    assert_eq!(details.label, ReadinessLabel::Ready);
    assert!(details.reasons.is_empty());
}

#[test]
fn cold_start_fails_every_check_in_fixed_order() {
    let settings = Settings::default();

    let details = compute_readiness(&ReadinessInput::default(), &settings);

    assert_eq!(details.score, 0);
    assert_eq!(details.label, ReadinessLabel::NotReady);
    assert_eq!(
        details.reasons,
        vec![
            "Router offline or unhealthy",
            "Low MOR balance",
            "No registered models",
            "No active bids",
        ]
    );
}

#[test]
fn partial_state_lands_in_the_degraded_band() {
    let settings = Settings::default();

    let health = normalize_health(Some(&json!({ "uptime": 900 }))).expect("decodes");
    let balance = normalize_balance(Some(&json!({ "MOR": "3000000000000000000" })));

    let details = compute_readiness(
        &ReadinessInput {
            health: Some(&health),
            balance: Some(&balance),
            ..ReadinessInput::default()
        },
        &settings,
    );

    assert_eq!(details.score, 50);
    assert_eq!(details.label, ReadinessLabel::Degraded);
    assert_eq!(
        details.reasons,
        vec!["No registered models", "No active bids"]
    );
}

#[test]
fn wallet_matching_scopes_model_checks_to_the_operator() {
    let settings = Settings {
        wallet_address: Some("0xBB".to_owned()),
        ..Settings::default()
    };

    let health = normalize_health(Some(&json!({ "status": "UP" }))).expect("decodes");
    let balance = normalize_balance(Some(&json!({ "mor": 7.5 })));
    // Wallet matches the second provider case-insensitively.
    let providers = normalize_providers(Some(&json!([
        { "Id": "p-1", "Address": "0xaa" },
        { "Id": "p-2", "Address": "0xbb" }
    ])));
    // Only a foreign model: the check must fail for p-2.
    let models = normalize_models(Some(&json!([
        { "id": "m-1", "providerId": "p-1" }
    ])));
    let bids = normalize_bids(Some(&json!([{ "id": "b-1" }])));

    let details = compute_readiness(
        &ReadinessInput {
            health: Some(&health),
            balance: Some(&balance),
            providers: &providers,
            models: &models,
            bids: &bids,
            primary_provider_id: None,
        },
        &settings,
    );

    assert_eq!(details.score, 75);
    assert_eq!(details.reasons, vec!["No registered models"]);
}
