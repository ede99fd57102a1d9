use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::generator::Tenor;
use crate::leg::{Leg, OptionType, Side};

/// Directional view, shared by market context and strategy structures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Bullish => "bullish",
            Direction::Bearish => "bearish",
            Direction::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    Call,
    Put,
    BullCallDebit,
    BearPutDebit,
    BullPutCredit,
    BearCallCredit,
}

impl StrategyType {
    pub const ALL: [StrategyType; 6] = [
        StrategyType::Call,
        StrategyType::Put,
        StrategyType::BullCallDebit,
        StrategyType::BearPutDebit,
        StrategyType::BullPutCredit,
        StrategyType::BearCallCredit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::Call => "CALL",
            StrategyType::Put => "PUT",
            StrategyType::BullCallDebit => "BULL_CALL_DEBIT",
            StrategyType::BearPutDebit => "BEAR_PUT_DEBIT",
            StrategyType::BullPutCredit => "BULL_PUT_CREDIT",
            StrategyType::BearCallCredit => "BEAR_CALL_CREDIT",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            StrategyType::Call | StrategyType::BullCallDebit | StrategyType::BullPutCredit => {
                Direction::Bullish
            }
            StrategyType::Put | StrategyType::BearPutDebit | StrategyType::BearCallCredit => {
                Direction::Bearish
            }
        }
    }

    pub fn is_credit(&self) -> bool {
        matches!(self, StrategyType::BullPutCredit | StrategyType::BearCallCredit)
    }

    /// Which side of the chain the structure is built from.
    pub fn option_type(&self) -> OptionType {
        match self {
            StrategyType::Call | StrategyType::BullCallDebit | StrategyType::BearCallCredit => {
                OptionType::Call
            }
            StrategyType::Put | StrategyType::BearPutDebit | StrategyType::BullPutCredit => {
                OptionType::Put
            }
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid StrategyType value: {s}"))
    }
}

/// Net premium at entry. Exactly one of debit / credit exists per structure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Premium {
    Debit(f64),
    Credit(f64),
}

impl Premium {
    pub fn amount(&self) -> f64 {
        match self {
            Premium::Debit(v) | Premium::Credit(v) => *v,
        }
    }
}

/// A strategy candidate on one underlying and one expiry.
///
/// `max_gain` and `max_loss` are always >= 0.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub strategy_type: StrategyType,
    pub underlying: String,
    pub spot: f64,
    pub expiry: NaiveDate,
    pub dte: i64,
    pub tenor: Tenor,
    pub legs: Vec<Leg>,
    pub premium: Premium,
    pub max_gain: f64,
    pub max_loss: f64,
    pub breakeven: f64,
    pub expected_move_pct: f64,
}

impl Candidate {
    pub fn direction(&self) -> Direction {
        self.strategy_type.direction()
    }

    pub fn is_credit(&self) -> bool {
        self.strategy_type.is_credit()
    }

    pub fn debit(&self) -> Option<f64> {
        match self.premium {
            Premium::Debit(v) => Some(v),
            Premium::Credit(_) => None,
        }
    }

    pub fn credit(&self) -> Option<f64> {
        match self.premium {
            Premium::Credit(v) => Some(v),
            Premium::Debit(_) => None,
        }
    }

    pub fn long_leg(&self) -> Option<&Leg> {
        self.legs.iter().find(|l| l.side == Side::Long)
    }

    pub fn short_leg(&self) -> Option<&Leg> {
        self.legs.iter().find(|l| l.side == Side::Short)
    }

    /// Expected move in price units.
    pub fn expected_move(&self) -> f64 {
        self.spot * self.expected_move_pct / 100.0
    }
}
