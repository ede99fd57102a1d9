//! Raw option-chain rows as delivered by upstream feeds.
//!
//! Vendors encode the same numeric field as a JSON number in one payload and
//! as a string (`"1,250"`, `" 0.35 "`, `"42%"`) in the next, and leave fields
//! out or `null` whenever they feel like it. `RawContractRow` keeps every field
//! as an untyped `serde_json::Value`; the coercion helpers below are the only
//! place that looks inside. Nothing past `leg::Leg::from_raw` sees this type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One untrusted chain row. Every field is optional and untyped.
///
/// Accepts both camelCase keys and the vendor snake_case / `contractID`
/// spelling.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawContractRow {
    #[serde(default, alias = "contractID", alias = "contractId", alias = "id")]
    pub contract_id: Option<Value>,

    #[serde(default, alias = "expiration", alias = "expirationDate")]
    pub expiry: Option<Value>,

    #[serde(default)]
    pub strike: Option<Value>,

    #[serde(default, rename = "type", alias = "optionType", alias = "contractType")]
    pub option_type: Option<Value>,

    #[serde(default)]
    pub bid: Option<Value>,

    #[serde(default)]
    pub ask: Option<Value>,

    #[serde(default)]
    pub mark: Option<Value>,

    #[serde(default, alias = "lastPrice")]
    pub last: Option<Value>,

    #[serde(default)]
    pub volume: Option<Value>,

    #[serde(default, alias = "openInterest")]
    pub open_interest: Option<Value>,

    #[serde(default, alias = "impliedVolatility", alias = "iv")]
    pub implied_volatility: Option<Value>,

    #[serde(default)]
    pub delta: Option<Value>,

    #[serde(default)]
    pub gamma: Option<Value>,

    #[serde(default)]
    pub theta: Option<Value>,

    #[serde(default)]
    pub vega: Option<Value>,
}

/// Coerce a loosely encoded numeric field.
///
/// Returns `None` for missing, `null`, non-numeric text, booleans, containers
/// and non-finite numbers. Never panics.
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let v = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_numeric_text(s)?,
        _ => return None,
    };

    v.is_finite().then_some(v)
}

/// Coerce a loosely encoded text field (ids, dates, type tags).
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_coerce() {
        assert_eq!(coerce_f64(Some(&json!(1.5))), Some(1.5));
        assert_eq!(coerce_f64(Some(&json!(7))), Some(7.0));
        assert_eq!(coerce_f64(Some(&json!(" 2.25 "))), Some(2.25));
        assert_eq!(coerce_f64(Some(&json!("1,250"))), Some(1250.0));
        assert_eq!(coerce_f64(Some(&json!("35%"))), Some(35.0));
        assert_eq!(coerce_f64(Some(&json!("-0.42"))), Some(-0.42));
    }

    #[test]
    fn garbage_coerces_to_none() {
        assert_eq!(coerce_f64(None), None);
        assert_eq!(coerce_f64(Some(&Value::Null)), None);
        assert_eq!(coerce_f64(Some(&json!(""))), None);
        assert_eq!(coerce_f64(Some(&json!("n/a"))), None);
        assert_eq!(coerce_f64(Some(&json!("NaN"))), None);
        assert_eq!(coerce_f64(Some(&json!("inf"))), None);
        assert_eq!(coerce_f64(Some(&json!(true))), None);
        assert_eq!(coerce_f64(Some(&json!([1.0]))), None);
    }

    #[test]
    fn text_coercion_trims_and_accepts_numbers() {
        assert_eq!(coerce_text(Some(&json!("  call "))), Some("call".into()));
        assert_eq!(coerce_text(Some(&json!(""))), None);
        assert_eq!(coerce_text(Some(&json!(123))), Some("123".into()));
        assert_eq!(coerce_text(Some(&Value::Null)), None);
    }

    #[test]
    fn vendor_and_camel_case_keys_both_deserialize() {
        let vendor: RawContractRow = serde_json::from_value(json!({
            "contractID": "AAPL250117C00100000",
            "expiration": "2025-01-17",
            "strike": "100.00",
            "type": "call",
            "open_interest": "1200",
            "implied_volatility": "0.31"
        }))
        .unwrap();

        let camel: RawContractRow = serde_json::from_value(json!({
            "contractId": "AAPL250117C00100000",
            "expiry": "2025-01-17",
            "strike": 100.0,
            "optionType": "call",
            "openInterest": 1200,
            "impliedVolatility": 0.31
        }))
        .unwrap();

        assert_eq!(coerce_f64(vendor.open_interest.as_ref()), Some(1200.0));
        assert_eq!(coerce_f64(camel.open_interest.as_ref()), Some(1200.0));
        assert_eq!(
            coerce_text(vendor.contract_id.as_ref()),
            coerce_text(camel.contract_id.as_ref())
        );
        assert_eq!(
            coerce_f64(vendor.implied_volatility.as_ref()),
            coerce_f64(camel.implied_volatility.as_ref())
        );
    }

    #[test]
    fn unknown_keys_and_nulls_are_tolerated() {
        let row: RawContractRow = serde_json::from_value(json!({
            "strike": null,
            "bid": "",
            "someVendorExtra": {"nested": true}
        }))
        .unwrap();

        assert_eq!(coerce_f64(row.strike.as_ref()), None);
        assert_eq!(coerce_f64(row.bid.as_ref()), None);
    }
}
