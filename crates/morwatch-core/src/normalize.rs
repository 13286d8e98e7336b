//! Tolerant normalization of loosely-typed router payloads.
//!
//! The router's upstream endpoints disagree on field casing (`stake` vs
//! `Stake`), field names (`providerId` vs `Owner`), and unit scales
//! (wei integers vs whole-unit floats). Every function here is pure and
//! total: unknown or malformed input yields partial or absent output,
//! never an error. Aliases are explicit ordered key lists, tried in
//! priority order with the first present value taken, so coverage stays
//! auditable per field.

use serde_json::{Map, Value};

use crate::domain::{
    Allowance, Bid, BlockchainBalance, Model, Provider, RouterHealth, TokenBalance,
};

/// Wei per whole token, as integer and float.
const WEI_PER_TOKEN: u128 = 1_000_000_000_000_000_000;
const WEI_PER_TOKEN_F64: f64 = 1e18;

/// Magnitude above which a bare JSON number is assumed to be wei-scaled.
///
/// Heuristic: a whole-unit balance legitimately above this cutoff would be
/// misclassified. A type hint from the upstream schema would remove the
/// guess; until the router provides one, the threshold stays.
pub const WEI_HEURISTIC_THRESHOLD: f64 = 1_000_000.0;

const ADDRESS_KEYS: &[&str] = &["address", "Address", "wallet", "Wallet"];
const MOR_KEYS: &[&str] = &["mor", "MOR", "Mor", "MOR_BALANCE"];
const ETH_KEYS: &[&str] = &["eth", "ETH", "Eth"];
const TOKEN_LIST_KEYS: &[&str] = &["tokens", "Tokens"];
const TOKEN_SYMBOL_KEYS: &[&str] = &["symbol", "Symbol", "token"];
const TOKEN_BALANCE_KEYS: &[&str] = &["balance", "Balance", "amount", "Amount"];
const ALLOWANCE_KEYS: &[&str] = &["allowance", "Allowance"];
const APPROVED_KEYS: &[&str] = &["approved", "Approved", "isApproved"];
const AMOUNT_KEYS: &[&str] = &["amount", "Amount"];

/// Convert a raw value of unknown shape to a whole-unit amount.
///
/// - absent or null yields `None`;
/// - a decimal-digit-only string is an integer wei amount, divided by
///   10^18 with wide-integer arithmetic so large balances keep precision;
/// - a bare number is divided by 10^18 only when it exceeds
///   [`WEI_HEURISTIC_THRESHOLD`], otherwise returned unchanged;
/// - any other string is parsed as a plain decimal; non-finite results
///   yield `None`.
pub fn from_wei(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => None,
        Value::Number(number) => {
            let n = number.as_f64()?;
            if n > WEI_HEURISTIC_THRESHOLD {
                Some(n / WEI_PER_TOKEN_F64)
            } else {
                Some(n)
            }
        }
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return wei_string_to_whole(trimmed);
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Integer division into whole and fractional parts keeps ~19 significant
/// digits where a straight f64 parse of the wei string would not.
fn wei_string_to_whole(digits: &str) -> Option<f64> {
    if let Ok(wei) = digits.parse::<u128>() {
        let whole = (wei / WEI_PER_TOKEN) as f64;
        let frac = (wei % WEI_PER_TOKEN) as f64 / WEI_PER_TOKEN_F64;
        return Some(whole + frac);
    }
    // Beyond u128 range (>38 digits); precision is already lost anyway.
    digits
        .parse::<f64>()
        .ok()
        .map(|n| n / WEI_PER_TOKEN_F64)
        .filter(|n| n.is_finite())
}

/// First non-null value among the candidate keys.
fn first_value<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|value| !value.is_null()))
}

/// First non-empty string among the candidate keys.
fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

/// First array value among the candidate keys.
fn first_array<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|key| obj.get(*key).and_then(Value::as_array))
}

/// Loose boolean coercion: null, false, zero, and the empty string are
/// falsy; everything else present is truthy.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn as_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// Unwrap a list response that may be a bare array or an object with the
/// list nested under `key`. Anything else yields an empty sequence.
pub fn unwrap_array<'a>(value: Option<&'a Value>, key: &str) -> &'a [Value] {
    match value {
        Some(Value::Array(items)) => items,
        Some(Value::Object(obj)) => obj
            .get(key)
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    }
}

/// Decode a health payload. Presence handling only; no unit scales here.
pub fn normalize_health(data: Option<&Value>) -> Option<RouterHealth> {
    serde_json::from_value(data?.clone()).ok()
}

/// Normalize a balance payload into whole-unit token balances.
///
/// MOR and ETH are promoted into named fields and appended to the token
/// sequence; extra entries from the raw token array are kept only when
/// both a symbol and a scaled balance resolve.
pub fn normalize_balance(data: Option<&Value>) -> BlockchainBalance {
    let empty = Map::new();
    let obj = as_object(data).unwrap_or(&empty);

    let address = first_string(obj, ADDRESS_KEYS);
    let mor_balance = from_wei(first_value(obj, MOR_KEYS));
    let eth_balance = from_wei(first_value(obj, ETH_KEYS));

    let mut tokens = Vec::new();
    if let Some(balance) = mor_balance {
        tokens.push(TokenBalance::new("MOR", balance));
    }
    if let Some(balance) = eth_balance {
        tokens.push(TokenBalance::new("ETH", balance));
    }

    for entry in first_array(obj, TOKEN_LIST_KEYS).map_or(&[][..], Vec::as_slice) {
        let Some(token) = entry.as_object() else {
            continue;
        };
        let symbol = first_string(token, TOKEN_SYMBOL_KEYS);
        let balance = from_wei(first_value(token, TOKEN_BALANCE_KEYS));
        if let (Some(symbol), Some(balance)) = (symbol, balance) {
            tokens.push(TokenBalance::new(symbol, balance));
        }
    }

    let allowance = as_object(first_value(obj, ALLOWANCE_KEYS)).and_then(|raw| {
        let present = APPROVED_KEYS
            .iter()
            .chain(AMOUNT_KEYS)
            .any(|key| raw.contains_key(*key));
        present.then(|| Allowance {
            approved: truthy(first_value(raw, APPROVED_KEYS)),
            amount: from_wei(first_value(raw, AMOUNT_KEYS)),
        })
    });

    BlockchainBalance {
        address,
        mor: mor_balance.map(|balance| TokenBalance::new("MOR", balance)),
        eth: eth_balance.map(|balance| TokenBalance::new("ETH", balance)),
        tokens,
        allowance,
    }
}

/// Normalize one provider record. Non-object input yields `None`.
pub fn normalize_provider(raw: &Value) -> Option<Provider> {
    let obj = raw.as_object()?;
    let address = first_string(obj, &["address", "Address", "Provider", "Id"]);
    let id = first_string(obj, &["id", "Id"])
        .or_else(|| address.clone())
        .unwrap_or_default();

    Some(Provider {
        id,
        address: address.unwrap_or_default(),
        stake: from_wei(first_value(obj, &["stake", "Stake"])),
        status: first_string(obj, &["status", "Status"]),
        is_registered: truthy(first_value(
            obj,
            &["isRegistered", "IsRegistered", "Active", "active"],
        )) && !truthy(obj.get("IsDeleted")),
        active: truthy(first_value(obj, &["active", "Active"])),
        models: None,
        bids: None,
        metadata: obj.clone(),
    })
}

/// Normalize one model record. Non-object input yields `None`.
pub fn normalize_model(raw: &Value) -> Option<Model> {
    let obj = raw.as_object()?;
    Some(Model {
        id: first_string(obj, &["id", "Id", "modelId"]).unwrap_or_default(),
        provider_id: first_string(obj, &["providerId", "ProviderId", "Owner", "owner"]),
        stake: from_wei(first_value(obj, &["stake", "Stake"])),
        fee_per_second: from_wei(first_value(obj, &["fee", "Fee"])),
        price_floor: from_wei(first_value(obj, &["priceFloor", "PriceFloor"])),
        tags: first_array(obj, &["tags", "Tags"])
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        metadata: obj.clone(),
    })
}

/// Normalize one bid record. Non-object input yields `None`.
pub fn normalize_bid(raw: &Value) -> Option<Bid> {
    let obj = raw.as_object()?;
    Some(Bid {
        id: first_string(obj, &["id", "Id"]).unwrap_or_default(),
        provider_id: first_string(obj, &["providerId", "Provider", "provider"]),
        model_id: first_string(obj, &["modelId", "ModelId", "ModelAgentId"]),
        price_per_second: from_wei(first_value(obj, &["pricePerSecond", "PricePerSecond"])),
        status: first_string(obj, &["status", "Status"]),
        created_at: first_string(obj, &["createdAt", "CreatedAt"]),
        metadata: obj.clone(),
    })
}

/// Normalize a providers list response (bare array or `{"providers": [...]}`).
pub fn normalize_providers(data: Option<&Value>) -> Vec<Provider> {
    unwrap_array(data, "providers")
        .iter()
        .filter_map(normalize_provider)
        .collect()
}

/// Normalize a models list response (bare array or `{"models": [...]}`).
pub fn normalize_models(data: Option<&Value>) -> Vec<Model> {
    unwrap_array(data, "models")
        .iter()
        .filter_map(normalize_model)
        .collect()
}

/// Normalize a bids list response (bare array or `{"bids": [...]}`).
pub fn normalize_bids(data: Option<&Value>) -> Vec<Bid> {
    unwrap_array(data, "bids")
        .iter()
        .filter_map(normalize_bid)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_wei_absent_and_null_are_none() {
        assert_eq!(from_wei(None), None);
        assert_eq!(from_wei(Some(&Value::Null)), None);
    }

    #[test]
    fn from_wei_digit_strings_divide_by_ten_pow_eighteen() {
        let cases = [
            ("0", 0.0),
            ("1000000000000000000", 1.0),
            ("2500000000000000000", 2.5),
            ("5000000000000000000", 5.0),
        ];
        for (raw, expected) in cases {
            let got = from_wei(Some(&json!(raw))).expect("digits must convert");
            assert!((got - expected).abs() < 1e-12, "{raw} -> {got}");
        }
    }

    #[test]
    fn from_wei_keeps_precision_for_large_integers() {
        // 123456789.987654321 MOR; a straight f64 parse of the wei string
        // would lose the tail.
        let got = from_wei(Some(&json!("123456789987654321000000000"))).expect("must convert");
        assert!((got - 123_456_789.987_654_321).abs() < 1e-6);
    }

    #[test]
    fn from_wei_numbers_respect_the_magnitude_heuristic() {
        assert_eq!(from_wei(Some(&json!(5))), Some(5.0));
        assert_eq!(from_wei(Some(&json!(1_000_000))), Some(1_000_000.0));
        assert_eq!(from_wei(Some(&json!(2.5e18))), Some(2.5));
    }

    #[test]
    fn from_wei_plain_decimal_strings_pass_through() {
        assert_eq!(from_wei(Some(&json!("2.5"))), Some(2.5));
        assert_eq!(from_wei(Some(&json!("  42.0  "))), Some(42.0));
        assert_eq!(from_wei(Some(&json!("not-a-number"))), None);
        assert_eq!(from_wei(Some(&json!(""))), None);
        assert_eq!(from_wei(Some(&json!(true))), None);
    }

    #[test]
    fn balance_promotes_mor_and_eth_into_named_fields() {
        let balance = normalize_balance(Some(&json!({
            "Address": "0xabc",
            "MOR": "2500000000000000000",
            "eth": "1000000000000000000",
        })));

        assert_eq!(balance.address.as_deref(), Some("0xabc"));
        let mor = balance.mor.expect("mor present");
        assert!((mor.balance - 2.5).abs() < 1e-12);
        assert_eq!(balance.tokens.len(), 2);
        assert_eq!(balance.tokens[0].symbol, "MOR");
        assert_eq!(balance.tokens[1].symbol, "ETH");
    }

    #[test]
    fn balance_drops_token_entries_missing_symbol_or_amount() {
        let balance = normalize_balance(Some(&json!({
            "tokens": [
                { "symbol": "USDC", "balance": "3000000000000000000" },
                { "symbol": "DAI" },
                { "balance": "1000000000000000000" },
                "garbage",
            ]
        })));

        assert_eq!(balance.tokens.len(), 1);
        assert_eq!(balance.tokens[0].symbol, "USDC");
        assert!((balance.tokens[0].balance - 3.0).abs() < 1e-12);
    }

    #[test]
    fn balance_allowance_requires_approved_or_amount() {
        let with = normalize_balance(Some(&json!({
            "allowance": { "isApproved": true, "amount": "2000000000000000000" }
        })));
        let allowance = with.allowance.expect("allowance present");
        assert!(allowance.approved);
        assert!((allowance.amount.expect("amount") - 2.0).abs() < 1e-12);

        let without = normalize_balance(Some(&json!({ "allowance": { "spender": "0xdead" } })));
        assert_eq!(without.allowance, None);
    }

    #[test]
    fn balance_of_non_object_input_is_empty() {
        let balance = normalize_balance(Some(&json!("oops")));
        assert_eq!(balance, BlockchainBalance::default());
        assert_eq!(normalize_balance(None), BlockchainBalance::default());
    }

    #[test]
    fn provider_id_falls_back_to_address_then_empty() {
        let by_id = normalize_provider(&json!({ "Id": "p-1", "Address": "0xaa" }))
            .expect("object input");
        assert_eq!(by_id.id, "p-1");

        let by_address = normalize_provider(&json!({ "Address": "0xaa" })).expect("object input");
        assert_eq!(by_address.id, "0xaa");
        assert_eq!(by_address.address, "0xaa");

        let bare = normalize_provider(&json!({})).expect("object input");
        assert_eq!(bare.id, "");
        assert_eq!(bare.address, "");
    }

    #[test]
    fn provider_registration_respects_deletion_flag() {
        let active = normalize_provider(&json!({ "Active": true })).expect("object input");
        assert!(active.is_registered);

        let deleted = normalize_provider(&json!({ "Active": true, "IsDeleted": true }))
            .expect("object input");
        assert!(!deleted.is_registered);

        let explicit_false =
            normalize_provider(&json!({ "isRegistered": false, "Active": true }))
                .expect("object input");
        // The first alias present wins; `Active` is not consulted.
        assert!(!explicit_false.is_registered);
    }

    #[test]
    fn provider_normalization_is_idempotent_on_its_metadata() {
        let raw = json!({ "Id": "p-7", "Address": "0xbb", "Stake": "4000000000000000000" });
        let first = normalize_provider(&raw).expect("object input");
        let again = normalize_provider(&Value::Object(first.metadata.clone()))
            .expect("metadata is an object");
        assert_eq!(again.id, first.id);
        assert_eq!(again.address, first.address);
        assert_eq!(again.stake, first.stake);
    }

    #[test]
    fn provider_rejects_non_object_input() {
        assert!(normalize_provider(&json!("p-1")).is_none());
        assert!(normalize_provider(&json!(null)).is_none());
        assert!(normalize_provider(&json!([1, 2])).is_none());
    }

    #[test]
    fn model_aliases_owner_and_converts_fees() {
        let model = normalize_model(&json!({
            "modelId": "m-1",
            "Owner": "p-1",
            "Fee": "1000000000000000",
            "PriceFloor": "2000000000000000",
            "Tags": ["llm", "chat", 7],
        }))
        .expect("object input");

        assert_eq!(model.id, "m-1");
        assert_eq!(model.provider_id.as_deref(), Some("p-1"));
        assert!((model.fee_per_second.expect("fee") - 0.001).abs() < 1e-12);
        assert!((model.price_floor.expect("floor") - 0.002).abs() < 1e-12);
        assert_eq!(model.tags, vec!["llm", "chat"]);
    }

    #[test]
    fn bid_aliases_model_agent_id() {
        let bid = normalize_bid(&json!({
            "Id": "b-1",
            "Provider": "p-1",
            "ModelAgentId": "m-1",
            "PricePerSecond": "5000000000000000",
            "CreatedAt": "2025-05-01T00:00:00Z",
        }))
        .expect("object input");

        assert_eq!(bid.id, "b-1");
        assert_eq!(bid.provider_id.as_deref(), Some("p-1"));
        assert_eq!(bid.model_id.as_deref(), Some("m-1"));
        assert!((bid.price_per_second.expect("price") - 0.005).abs() < 1e-12);
        assert_eq!(bid.created_at.as_deref(), Some("2025-05-01T00:00:00Z"));
    }

    #[test]
    fn list_unwrapping_accepts_bare_and_keyed_shapes() {
        let bare = json!([{ "Id": "p-1" }]);
        let keyed = json!({ "providers": [{ "Id": "p-1" }] });
        let neither = json!({ "items": [{ "Id": "p-1" }] });

        assert_eq!(
            normalize_providers(Some(&bare)),
            normalize_providers(Some(&keyed))
        );
        assert!(normalize_providers(Some(&neither)).is_empty());
        assert!(normalize_providers(None).is_empty());
    }

    #[test]
    fn health_decodes_and_tolerates_garbage() {
        let health = normalize_health(Some(&json!({ "status": "ok", "version": "1.2.3" })))
            .expect("object decodes");
        assert_eq!(health.status.as_deref(), Some("ok"));

        assert!(normalize_health(Some(&json!("down"))).is_none());
        assert!(normalize_health(None).is_none());
    }
}
