//! Gate configuration contract.
//!
//! Multipliers and hard-gate thresholds are owned by the caller, not by this
//! crate: there is deliberately no `Default`. Load them from JSON or from the
//! environment and `validate()` before use.
//!
//! JSON shape:
//! ```json
//! {
//!   "multipliers": { "ALLOW": 1.0, "WAIT": 0.8, "BLOCK": 0.5 },
//!   "thresholds": {
//!     "maxStaleSecondsRealtime": 120,
//!     "maxSpreadPct": 12,
//!     "minOpenInterest": 100,
//!     "minVolume": 10,
//!     "minCreditToRisk": 0.15
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permission::PermissionState;

pub const ENV_MULT_ALLOW: &str = "OPTSCAN_GATE_MULT_ALLOW";
pub const ENV_MULT_WAIT: &str = "OPTSCAN_GATE_MULT_WAIT";
pub const ENV_MULT_BLOCK: &str = "OPTSCAN_GATE_MULT_BLOCK";
pub const ENV_MAX_STALE_SECONDS_REALTIME: &str = "OPTSCAN_MAX_STALE_SECONDS_REALTIME";
pub const ENV_MAX_SPREAD_PCT: &str = "OPTSCAN_MAX_SPREAD_PCT";
pub const ENV_MIN_OPEN_INTEREST: &str = "OPTSCAN_MIN_OPEN_INTEREST";
pub const ENV_MIN_VOLUME: &str = "OPTSCAN_MIN_VOLUME";
pub const ENV_MIN_CREDIT_TO_RISK: &str = "OPTSCAN_MIN_CREDIT_TO_RISK";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("{key} is not a number: {value:?}")]
    NotANumber { key: &'static str, value: String },

    #[error("{key} = {value} is out of range ({expected})")]
    OutOfRange {
        key: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("invalid gate config json: {0}")]
    Json(String),
}

/// Score multiplier applied after gating, keyed by permission state.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GateMultipliers {
    #[serde(rename = "ALLOW")]
    pub allow: f64,
    #[serde(rename = "WAIT")]
    pub wait: f64,
    #[serde(rename = "BLOCK")]
    pub block: f64,
}

impl GateMultipliers {
    pub fn for_state(&self, state: PermissionState) -> f64 {
        match state {
            PermissionState::Allow => self.allow,
            PermissionState::Wait => self.wait,
            PermissionState::Block => self.block,
        }
    }
}

/// Hard-gate thresholds.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GateThresholds {
    /// REALTIME data older than this is treated as stale.
    pub max_stale_seconds_realtime: f64,
    /// Any leg with a wider bid-ask spread (percent of mid) blocks.
    pub max_spread_pct: f64,
    pub min_open_interest: f64,
    pub min_volume: f64,
    /// credit / maxLoss floor for credit structures.
    pub min_credit_to_risk: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    pub multipliers: GateMultipliers,
    pub thresholds: GateThresholds,
}

impl GateConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: GateConfig =
            serde_json::from_str(s).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read every setting from `OPTSCAN_*` environment variables. All are
    /// required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (env, a map in tests, a secrets store).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let num = |key: &'static str| -> Result<f64, ConfigError> {
            let raw = lookup(key).ok_or(ConfigError::Missing(key))?;
            raw.trim().parse::<f64>().map_err(|_| ConfigError::NotANumber {
                key,
                value: raw.clone(),
            })
        };

        let cfg = Self {
            multipliers: GateMultipliers {
                allow: num(ENV_MULT_ALLOW)?,
                wait: num(ENV_MULT_WAIT)?,
                block: num(ENV_MULT_BLOCK)?,
            },
            thresholds: GateThresholds {
                max_stale_seconds_realtime: num(ENV_MAX_STALE_SECONDS_REALTIME)?,
                max_spread_pct: num(ENV_MAX_SPREAD_PCT)?,
                min_open_interest: num(ENV_MIN_OPEN_INTEREST)?,
                min_volume: num(ENV_MIN_VOLUME)?,
                min_credit_to_risk: num(ENV_MIN_CREDIT_TO_RISK)?,
            },
        };

        cfg.validate()?;
        Ok(cfg)
    }

    /// Multipliers must be finite and in [0, 1] so gated scores stay in
    /// [0, 100]; thresholds must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.multipliers;
        for (key, value) in [
            ("multipliers.ALLOW", m.allow),
            ("multipliers.WAIT", m.wait),
            ("multipliers.BLOCK", m.block),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(ConfigError::OutOfRange {
                    key,
                    value,
                    expected: "finite, within [0, 1]",
                });
            }
        }

        let t = &self.thresholds;
        for (key, value) in [
            ("thresholds.maxStaleSecondsRealtime", t.max_stale_seconds_realtime),
            ("thresholds.maxSpreadPct", t.max_spread_pct),
            ("thresholds.minOpenInterest", t.min_open_interest),
            ("thresholds.minVolume", t.min_volume),
            ("thresholds.minCreditToRisk", t.min_credit_to_risk),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    key,
                    value,
                    expected: "finite, >= 0",
                });
            }
        }

        Ok(())
    }
}
