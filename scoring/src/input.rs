use chain::{ChainSnapshot, Direction, RawContractRow};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::permission::PermissionState;

/// Floor applied to a non-positive or non-finite expected move, in percent.
pub const MIN_EXPECTED_MOVE_PCT: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Freshness {
    Realtime,
    Delayed,
    Eod,
    Stale,
}

/// Trading horizon implied by the request timeframe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeframeClass {
    Intraday,
    Swing,
    Position,
}

impl TimeframeClass {
    /// `scalp`, `intraday`, minute frames and `1h` are intraday; `swing`,
    /// `4h`, `1d`, `daily` are swing; everything else is position.
    pub fn classify(timeframe: &str) -> Self {
        let t = timeframe.trim().to_ascii_lowercase();
        match t.as_str() {
            "scalp" | "scalping" | "intraday" | "1h" => TimeframeClass::Intraday,
            "swing" | "4h" | "1d" | "daily" => TimeframeClass::Swing,
            _ if is_minute_frame(&t) => TimeframeClass::Intraday,
            _ => TimeframeClass::Position,
        }
    }
}

fn is_minute_frame(t: &str) -> bool {
    t.strip_suffix("min")
        .or_else(|| t.strip_suffix('m'))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Everything needed to score one underlying.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub symbol: String,
    pub timeframe: String,
    pub spot: f64,
    pub expected_move_pct: f64,
    /// [0, 100]
    pub iv_rank: f64,
    pub market_direction: Direction,
    /// [0, 1]
    pub market_regime_alignment: f64,
    /// [0, 100]
    pub tf_confluence_score: f64,
    pub stale_seconds: f64,
    pub freshness: Freshness,
    /// [0, 1], higher is riskier.
    pub macro_risk: f64,
    pub raw_rows: Vec<RawContractRow>,
    #[serde(default)]
    pub time_permission: Option<PermissionState>,
    /// [0, 100]
    #[serde(default)]
    pub time_quality: Option<f64>,
    /// Valuation date for days-to-expiry; today (UTC) when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl ScoreInput {
    /// Clamp documented ranges instead of rejecting.
    ///
    /// Non-finite values take the most conservative reading: zero alignment
    /// and confluence, maximal macro risk and staleness.
    pub fn clamped(mut self) -> Self {
        self.iv_rank = clamp_or(self.iv_rank, 0.0, 100.0, 50.0);
        self.market_regime_alignment = clamp_or(self.market_regime_alignment, 0.0, 1.0, 0.0);
        self.tf_confluence_score = clamp_or(self.tf_confluence_score, 0.0, 100.0, 0.0);
        self.macro_risk = clamp_or(self.macro_risk, 0.0, 1.0, 1.0);
        self.stale_seconds = if self.stale_seconds.is_finite() {
            self.stale_seconds.max(0.0)
        } else {
            f64::MAX
        };
        self.expected_move_pct = if self.expected_move_pct.is_finite() {
            self.expected_move_pct.max(MIN_EXPECTED_MOVE_PCT)
        } else {
            MIN_EXPECTED_MOVE_PCT
        };
        self.time_quality = self
            .time_quality
            .filter(|q| q.is_finite())
            .map(|q| q.clamp(0.0, 100.0));
        self
    }

    pub fn as_of_or_today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn timeframe_class(&self) -> TimeframeClass {
        TimeframeClass::classify(&self.timeframe)
    }

    pub fn snapshot(&self, as_of: NaiveDate) -> ChainSnapshot<'_> {
        ChainSnapshot {
            underlying: &self.symbol,
            spot: self.spot,
            expected_move_pct: self.expected_move_pct,
            as_of,
            rows: &self.raw_rows,
        }
    }
}

fn clamp_or(x: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if x.is_finite() { x.clamp(lo, hi) } else { fallback }
}
