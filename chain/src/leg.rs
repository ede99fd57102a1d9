//! Leg Normalizer
//!
//! Converts one `RawContractRow` into a canonical, immutable `Leg`.
//!
//! ## Coercion rules
//! - prices, volume, open interest, IV: fall back to `0.0`, negatives floor at `0.0`
//! - greeks: fall back to `NaN` (unresolved), never guessed
//! - identity (type, strike > 0, expiry date): required; without them the row
//!   is not a contract and `Leg::from_raw` returns `None`
//!
//! ## Mid resolution
//! ```text
//! mark            if mark > 0
//! (bid + ask) / 2 if ask > 0 and bid >= 0
//! last            if last > 0
//! 0
//! ```
//!
//! Pure and total: malformed input never panics and never errors.

use chrono::NaiveDate;
use serde::Serialize;

use crate::raw::{RawContractRow, coerce_f64, coerce_text};

/// Spread percentage assigned to a leg without a usable mid.
///
/// Large enough to fail any sane `maxSpreadPct` ceiling.
pub const INVALID_SPREAD_PCT: f64 = 100.0;

/// Slippage proxy assigned to a leg without a usable mid.
pub const INVALID_SLIPPAGE_PROXY: f64 = 2.0;

/// Share of the bid-ask spread assumed lost on a fill.
const SLIPPAGE_SHARE_OF_SPREAD: f64 = 0.20;

/// Optional per-leg fields counted for data coverage.
pub const TRACKED_FIELDS: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "call" | "c" | "calls" => Some(OptionType::Call),
            "put" | "p" | "puts" => Some(OptionType::Put),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

/// Canonical option contract leg.
///
/// Greeks may be `NaN` when the feed did not resolve them; they serialize as
/// `null`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub id: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub side: Side,
    pub strike: f64,
    pub expiry: NaiveDate,
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
    pub last: f64,
    pub volume: f64,
    pub open_interest: f64,
    pub iv: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,

    /// How many of the `TRACKED_FIELDS` optional fields resolved.
    #[serde(skip)]
    resolved_fields: u8,
}

impl Leg {
    /// Normalize one raw row into a leg held on `side`.
    ///
    /// Returns `None` only when the row has no usable identity (type, strike,
    /// expiry). All other fields are coerced with fallbacks.
    pub fn from_raw(row: &RawContractRow, side: Side) -> Option<Self> {
        let option_type =
            coerce_text(row.option_type.as_ref()).and_then(|t| OptionType::parse(&t))?;
        let strike = coerce_f64(row.strike.as_ref()).filter(|s| *s > 0.0)?;
        let expiry = coerce_text(row.expiry.as_ref()).and_then(|t| parse_expiry(&t))?;

        let mut resolved = 0u8;
        let mut price = |v: Option<f64>| match v {
            Some(x) => {
                resolved += 1;
                x.max(0.0)
            }
            None => 0.0,
        };

        let bid = price(coerce_f64(row.bid.as_ref()));
        let ask = price(coerce_f64(row.ask.as_ref()));
        let volume = price(coerce_f64(row.volume.as_ref()));
        let open_interest = price(coerce_f64(row.open_interest.as_ref()));
        let iv = price(coerce_f64(row.implied_volatility.as_ref()));

        let mut greek = |v: Option<f64>| match v {
            Some(x) => {
                resolved += 1;
                x
            }
            None => f64::NAN,
        };

        let delta = greek(coerce_f64(row.delta.as_ref()));
        let gamma = greek(coerce_f64(row.gamma.as_ref()));
        let theta = greek(coerce_f64(row.theta.as_ref()));
        let vega = greek(coerce_f64(row.vega.as_ref()));

        let mark = coerce_f64(row.mark.as_ref()).unwrap_or(0.0);
        let last = coerce_f64(row.last.as_ref()).unwrap_or(0.0).max(0.0);

        let id = coerce_text(row.contract_id.as_ref()).unwrap_or_else(|| {
            let tag = match option_type {
                OptionType::Call => 'C',
                OptionType::Put => 'P',
            };
            format!("{}{}{}", expiry.format("%y%m%d"), tag, strike)
        });

        Some(Self {
            id,
            option_type,
            side,
            strike,
            expiry,
            bid,
            ask,
            mid: resolve_mid(bid, ask, mark, last),
            last,
            volume,
            open_interest,
            iv,
            delta,
            gamma,
            theta,
            vega,
            resolved_fields: resolved,
        })
    }

    /// The same contract held on the other side. Returns a new leg.
    pub fn with_side(&self, side: Side) -> Self {
        Self {
            side,
            ..self.clone()
        }
    }

    pub fn has_valid_mid(&self) -> bool {
        self.mid > 0.0
    }

    /// Bid-ask spread as a percentage of mid.
    pub fn spread_pct(&self) -> f64 {
        if !self.has_valid_mid() {
            return INVALID_SPREAD_PCT;
        }
        ((self.ask - self.bid).max(0.0) / self.mid) * 100.0
    }

    /// Cheap fill-cost proxy: a fifth of the relative bid-ask spread.
    pub fn slippage_proxy(&self) -> f64 {
        if !self.has_valid_mid() {
            return INVALID_SLIPPAGE_PROXY;
        }
        SLIPPAGE_SHARE_OF_SPREAD * (self.ask - self.bid).max(0.0) / self.mid
    }

    /// Share of optional fields that resolved to usable values, in [0, 1].
    pub fn coverage(&self) -> f64 {
        f64::from(self.resolved_fields) / f64::from(TRACKED_FIELDS)
    }
}

/// Resolve the working mid price. See module docs for the order.
pub fn resolve_mid(bid: f64, ask: f64, mark: f64, last: f64) -> f64 {
    if mark > 0.0 {
        mark
    } else if ask > 0.0 && bid >= 0.0 {
        (bid + ask) / 2.0
    } else if last > 0.0 {
        last
    } else {
        0.0
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_expiry(text: &str) -> Option<NaiveDate> {
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
