//! Versioned scoring model.
//!
//! Every weight, band and cut point used by the generator, feature extractor,
//! scorer and grader lives here. Payloads carry `ScoringModel::VERSION` so a
//! historical score can be read against the formula that produced it.
//!
//! Changing any default value below requires bumping `VERSION`.

use chain::GeneratorConfig;

/// Linear normalization range; `norm` maps `lo -> 0`, `hi -> 1`, clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Non-finite input normalizes to 0.
    pub fn norm(&self, x: f64) -> f64 {
        if !x.is_finite() {
            return 0.0;
        }
        if self.hi <= self.lo {
            return if x >= self.hi { 1.0 } else { 0.0 };
        }
        ((x - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0)
    }
}

/// Per-leg liquidity blend.
#[derive(Clone, Debug, PartialEq)]
pub struct LiquidityModel {
    pub open_interest: Range,
    pub volume: Range,
    pub spread_pct: Range,
    pub open_interest_weight: f64,
    pub volume_weight: f64,
    pub tight_spread_weight: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PayoffModel {
    /// credit / maxLoss
    pub credit_to_risk: Range,
    /// maxGain / debit
    pub reward_to_debit: Range,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DteModel {
    /// Applied to `14 - dte`.
    pub intraday: Range,
    pub intraday_horizon: f64,
    pub swing: Range,
    pub position: Range,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FreshnessScale {
    pub realtime: f64,
    pub delayed: f64,
    pub eod: f64,
    pub stale: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContextWeights {
    pub vol_fit: f64,
    pub regime_alignment: f64,
    pub liquidity: f64,
    pub data_freshness: f64,
    pub macro_calm: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetupWeights {
    pub directional_agreement: f64,
    pub breakeven_fit: f64,
    pub payoff: f64,
    pub tf_confluence: f64,
    pub p_win_proxy: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionWeights {
    pub liquidity: f64,
    pub fill_quality: f64,
    pub dte_suitability: f64,
    pub risk_reward: f64,
    pub time_window_fit: f64,
}

/// Layer blend into the composite base score.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseWeights {
    pub context: f64,
    pub setup: f64,
    pub execution: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerWeights {
    pub context: ContextWeights,
    pub setup: SetupWeights,
    pub execution: ExecutionWeights,
    pub base: BaseWeights,
}

/// Soft-warning trip points on feature values.
#[derive(Clone, Debug, PartialEq)]
pub struct WarningThresholds {
    pub min_tf_confluence: f64,
    pub min_fill_quality: f64,
    pub min_dte_suitability: f64,
    /// More than this many warnings turns ALLOW into WAIT.
    pub max_warnings_for_allow: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grading {
    pub confidence_floor: f64,
    pub confidence_ceiling: f64,
    pub high_quality_at: f64,
    pub medium_quality_at: f64,
    /// tfConfluenceScore cut points for alignment 4, 3, 2 (else 1).
    pub tf_alignment_cuts: [f64; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringModel {
    pub generator: GeneratorConfig,
    pub liquidity: LiquidityModel,
    /// Summed leg slippage proxy range for fill quality.
    pub fill_slippage: Range,
    pub payoff: PayoffModel,
    /// |delta| of the long leg for debit structures.
    pub debit_delta: Range,
    pub iv_rank: Range,
    pub dte: DteModel,
    /// Payoff share of the execution layer's risk/reward blend; the rest is pWin.
    pub risk_reward_payoff_share: f64,
    pub freshness: FreshnessScale,
    /// timeWindowFit when neither timeQuality nor timePermission is supplied.
    pub default_time_window_fit: f64,
    /// pWin proxy when the relevant delta is unresolved.
    pub unresolved_delta_p_win: f64,
    pub weights: LayerWeights,
    pub warnings: WarningThresholds,
    pub grading: Grading,
}

impl ScoringModel {
    pub const VERSION: &'static str = "opt-scorer/1";
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            liquidity: LiquidityModel {
                open_interest: Range::new(50.0, 5_000.0),
                volume: Range::new(10.0, 5_000.0),
                spread_pct: Range::new(0.5, 6.0),
                open_interest_weight: 0.45,
                volume_weight: 0.35,
                tight_spread_weight: 0.20,
            },
            fill_slippage: Range::new(0.0, 1.5),
            payoff: PayoffModel {
                credit_to_risk: Range::new(0.10, 0.45),
                reward_to_debit: Range::new(0.5, 3.0),
            },
            debit_delta: Range::new(0.35, 0.70),
            iv_rank: Range::new(20.0, 80.0),
            dte: DteModel {
                intraday: Range::new(0.0, 14.0),
                intraday_horizon: 14.0,
                swing: Range::new(14.0, 45.0),
                position: Range::new(30.0, 90.0),
            },
            risk_reward_payoff_share: 0.7,
            freshness: FreshnessScale {
                realtime: 1.0,
                delayed: 0.7,
                eod: 0.4,
                stale: 0.0,
            },
            default_time_window_fit: 1.0,
            unresolved_delta_p_win: 0.5,
            weights: LayerWeights {
                context: ContextWeights {
                    vol_fit: 0.30,
                    regime_alignment: 0.20,
                    liquidity: 0.20,
                    data_freshness: 0.15,
                    macro_calm: 0.15,
                },
                setup: SetupWeights {
                    directional_agreement: 0.20,
                    breakeven_fit: 0.25,
                    payoff: 0.20,
                    tf_confluence: 0.20,
                    p_win_proxy: 0.15,
                },
                execution: ExecutionWeights {
                    liquidity: 0.35,
                    fill_quality: 0.22,
                    dte_suitability: 0.18,
                    risk_reward: 0.15,
                    time_window_fit: 0.10,
                },
                base: BaseWeights {
                    context: 0.30,
                    setup: 0.45,
                    execution: 0.25,
                },
            },
            warnings: WarningThresholds {
                min_tf_confluence: 0.45,
                min_fill_quality: 0.55,
                min_dte_suitability: 0.50,
                max_warnings_for_allow: 1,
            },
            grading: Grading {
                confidence_floor: 1.0,
                confidence_ceiling: 99.0,
                high_quality_at: 76.0,
                medium_quality_at: 55.0,
                tf_alignment_cuts: [78.0, 62.0, 45.0],
            },
        }
    }
}
