//! Feature extraction.
//!
//! Maps one candidate plus its market context onto normalized factors in
//! [0, 1], grouped by the layer that consumes them. Every function here is
//! pure; unresolved inputs take the documented fallback instead of erroring.

use chain::{Candidate, Direction, Leg};
use serde::Serialize;
use tracing::debug;

use crate::input::{Freshness, ScoreInput, TimeframeClass};
use crate::model::{FreshnessScale, ScoringModel};
use crate::permission::PermissionState;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFeatures {
    pub vol_fit: f64,
    pub regime_alignment: f64,
    pub liquidity: f64,
    pub data_freshness: f64,
    /// `1 - macroRisk`
    pub macro_calm: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupFeatures {
    pub directional_agreement: f64,
    pub breakeven_fit: f64,
    pub payoff: f64,
    pub tf_confluence: f64,
    pub p_win_proxy: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFeatures {
    pub liquidity: f64,
    pub fill_quality: f64,
    pub dte_suitability: f64,
    /// Payoff / pWin blend.
    pub risk_reward: f64,
    pub time_window_fit: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub context: ContextFeatures,
    pub setup: SetupFeatures,
    pub execution: ExecutionFeatures,
}

/// Per-request extractor. Context-only factors are computed once here and
/// shared by every candidate of the request.
#[derive(Clone, Debug)]
pub struct FeatureExtractor<'a> {
    model: &'a ScoringModel,
    iv_rank: f64,
    market_direction: Direction,
    timeframe: TimeframeClass,
    regime_alignment: f64,
    data_freshness: f64,
    macro_calm: f64,
    tf_confluence: f64,
    time_window_fit: f64,
}

impl<'a> FeatureExtractor<'a> {
    /// `input` is expected to be `clamped()` already.
    pub fn new(model: &'a ScoringModel, input: &ScoreInput) -> Self {
        let extractor = Self {
            model,
            iv_rank: input.iv_rank,
            market_direction: input.market_direction,
            timeframe: input.timeframe_class(),
            regime_alignment: input.market_regime_alignment,
            data_freshness: freshness_factor(&model.freshness, input.freshness),
            macro_calm: 1.0 - input.macro_risk,
            tf_confluence: input.tf_confluence_score / 100.0,
            time_window_fit: time_window_fit(
                input.time_quality,
                input.time_permission,
                model.default_time_window_fit,
            ),
        };

        debug!(
            target: "features",
            symbol = %input.symbol,
            timeframe = ?extractor.timeframe,
            data_freshness = extractor.data_freshness,
            macro_calm = extractor.macro_calm,
            time_window_fit = extractor.time_window_fit,
            "request context factors"
        );

        extractor
    }

    /// Request-level time-window factor, identical for every candidate.
    pub fn time_window_fit(&self) -> f64 {
        self.time_window_fit
    }

    pub fn extract(&self, c: &Candidate) -> FeatureSet {
        let m = self.model;

        let liquidity = liquidity(m, &c.legs);
        let payoff = payoff(m, c);
        let p_win = p_win_proxy(m, c);
        let share = m.risk_reward_payoff_share;

        FeatureSet {
            context: ContextFeatures {
                vol_fit: vol_fit(m, self.iv_rank, c.is_credit()),
                regime_alignment: self.regime_alignment,
                liquidity,
                data_freshness: self.data_freshness,
                macro_calm: self.macro_calm,
            },
            setup: SetupFeatures {
                directional_agreement: directional_agreement(c.direction(), self.market_direction),
                breakeven_fit: breakeven_fit(c),
                payoff,
                tf_confluence: self.tf_confluence,
                p_win_proxy: p_win,
            },
            execution: ExecutionFeatures {
                liquidity,
                fill_quality: fill_quality(m, &c.legs),
                dte_suitability: dte_suitability(m, self.timeframe, c.dte),
                risk_reward: share * payoff + (1.0 - share) * p_win,
                time_window_fit: self.time_window_fit,
            },
        }
    }
}

/// Open interest, volume and tightness of quote, blended.
pub fn leg_liquidity(m: &ScoringModel, leg: &Leg) -> f64 {
    let l = &m.liquidity;
    l.open_interest_weight * l.open_interest.norm(leg.open_interest)
        + l.volume_weight * l.volume.norm(leg.volume)
        + l.tight_spread_weight * (1.0 - l.spread_pct.norm(leg.spread_pct()))
}

/// Weakest leg dominates fill risk.
pub fn liquidity(m: &ScoringModel, legs: &[Leg]) -> f64 {
    legs.iter()
        .map(|leg| leg_liquidity(m, leg))
        .reduce(f64::min)
        .unwrap_or(0.0)
}

pub fn fill_quality(m: &ScoringModel, legs: &[Leg]) -> f64 {
    let slippage: f64 = legs.iter().map(Leg::slippage_proxy).sum();
    1.0 - m.fill_slippage.norm(slippage)
}

/// How comfortably the expected move covers the structure.
///
/// Debit: share of the expected move left after reaching breakeven.
/// Credit: out-of-the-money cushion of the short strike, in expected moves.
pub fn breakeven_fit(c: &Candidate) -> f64 {
    let em = c.expected_move();
    if !(em > 0.0) {
        return 0.0;
    }

    let bullish = c.direction() == Direction::Bullish;

    if c.is_credit() {
        let Some(short) = c.short_leg() else {
            return 0.0;
        };
        let buffer = if bullish {
            c.spot - short.strike
        } else {
            short.strike - c.spot
        };
        return (buffer.max(0.0) / em).clamp(0.0, 1.0);
    }

    let distance = if bullish {
        c.breakeven - c.spot
    } else {
        c.spot - c.breakeven
    };
    ((em - distance.max(0.0)) / em).clamp(0.0, 1.0)
}

pub fn payoff(m: &ScoringModel, c: &Candidate) -> f64 {
    if let Some(credit) = c.credit() {
        if c.max_loss <= 0.0 {
            return if credit > 0.0 { 1.0 } else { 0.0 };
        }
        return m.payoff.credit_to_risk.norm(credit / c.max_loss);
    }

    match c.debit() {
        Some(debit) if debit > 0.0 => m.payoff.reward_to_debit.norm(c.max_gain / debit),
        _ => 0.0,
    }
}

/// Delta heuristic, not a calibrated probability.
pub fn p_win_proxy(m: &ScoringModel, c: &Candidate) -> f64 {
    if c.is_credit() {
        return match c.short_leg().map(|l| l.delta) {
            Some(d) if d.is_finite() => (1.0 - d.abs()).clamp(0.0, 1.0),
            _ => m.unresolved_delta_p_win,
        };
    }

    match c.long_leg().map(|l| l.delta) {
        Some(d) if d.is_finite() => m.debit_delta.norm(d.abs()),
        _ => m.unresolved_delta_p_win,
    }
}

/// Sellers want rich premium, buyers want cheap premium.
pub fn vol_fit(m: &ScoringModel, iv_rank: f64, is_credit: bool) -> f64 {
    let rich = m.iv_rank.norm(iv_rank);
    if is_credit { rich } else { 1.0 - rich }
}

pub fn directional_agreement(candidate: Direction, market: Direction) -> f64 {
    match market {
        Direction::Neutral => 0.5,
        _ if candidate == market => 1.0,
        _ => 0.0,
    }
}

pub fn dte_suitability(m: &ScoringModel, timeframe: TimeframeClass, dte: i64) -> f64 {
    let dte = dte as f64;
    match timeframe {
        TimeframeClass::Intraday => m.dte.intraday.norm(m.dte.intraday_horizon - dte),
        TimeframeClass::Swing => m.dte.swing.norm(dte),
        TimeframeClass::Position => m.dte.position.norm(dte),
    }
}

pub fn freshness_factor(scale: &FreshnessScale, freshness: Freshness) -> f64 {
    match freshness {
        Freshness::Realtime => scale.realtime,
        Freshness::Delayed => scale.delayed,
        Freshness::Eod => scale.eod,
        Freshness::Stale => scale.stale,
    }
}

pub fn time_window_fit(
    quality: Option<f64>,
    permission: Option<PermissionState>,
    fallback: f64,
) -> f64 {
    if let Some(q) = quality {
        return (q / 100.0).clamp(0.0, 1.0);
    }
    match permission {
        Some(PermissionState::Allow) => 1.0,
        Some(PermissionState::Wait) => 0.5,
        Some(PermissionState::Block) => 0.0,
        None => fallback,
    }
}
