#![allow(dead_code)]

use scoring::{GateConfig, ScoreInput};
use serde_json::{Value, json};

pub const AS_OF: &str = "2025-03-03";
/// 10 days after `AS_OF`: weekly tenor.
pub const WEEKLY: &str = "2025-03-13";
/// 30 days after `AS_OF`: monthly tenor.
pub const MONTHLY: &str = "2025-04-02";

pub fn gate_config() -> GateConfig {
    GateConfig::from_json_str(
        r#"{
            "multipliers": { "ALLOW": 1.0, "WAIT": 0.8, "BLOCK": 0.5 },
            "thresholds": {
                "maxStaleSecondsRealtime": 60,
                "maxSpreadPct": 10,
                "minOpenInterest": 100,
                "minVolume": 10,
                "minCreditToRisk": 0.1
            }
        }"#,
    )
    .unwrap()
}

/// Calls and puts at 98 / 100 / 102 around spot 100 with tight quotes.
pub fn chain(expiry: &str, open_interest: f64, volume: f64) -> Vec<Value> {
    [
        ("call", 98.0, 3.0, 0.62),
        ("call", 100.0, 1.8, 0.50),
        ("call", 102.0, 0.9, 0.36),
        ("put", 98.0, 0.9, -0.36),
        ("put", 100.0, 1.8, -0.50),
        ("put", 102.0, 3.0, -0.64),
    ]
    .into_iter()
    .map(|(kind, strike, mid, delta)| {
        let bid = mid - 0.02;
        let ask = mid + 0.02;
        json!({
            "contractID": format!("XYZ-{expiry}-{kind}-{strike}"),
            "expiration": expiry,
            "type": kind,
            "strike": strike,
            "bid": bid,
            "ask": ask,
            "volume": volume,
            "open_interest": open_interest,
            "implied_volatility": 0.24,
            "delta": delta,
            "gamma": 0.05,
            "theta": -0.04,
            "vega": 0.08
        })
    })
    .collect()
}

pub fn input_with(symbol: &str, rows: Vec<Value>) -> ScoreInput {
    serde_json::from_value(json!({
        "symbol": symbol,
        "timeframe": "swing",
        "spot": 100.0,
        "expectedMovePct": 3.0,
        "ivRank": 45,
        "marketDirection": "bullish",
        "marketRegimeAlignment": 0.7,
        "tfConfluenceScore": 70,
        "staleSeconds": 0,
        "freshness": "REALTIME",
        "macroRisk": 0.2,
        "rawRows": rows,
        "asOf": AS_OF
    }))
    .unwrap()
}

/// Scenario A input: one healthy 10-DTE expiry.
pub fn scenario_a() -> ScoreInput {
    input_with("XYZ", chain(WEEKLY, 1000.0, 500.0))
}
