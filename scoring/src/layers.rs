//! Layer scorer.
//!
//! ```text
//! context   = Σ contextWeight_i   · contextFeature_i   · 100
//! setup     = Σ setupWeight_i     · setupFeature_i     · 100
//! execution = Σ executionWeight_i · executionFeature_i · 100
//! baseScore = wC·context + wS·setup + wE·execution
//! ```
//!
//! Each contribution records `baseWeight · weight · value · 100` points, so the
//! contributions add up to the unclamped base score.

use serde::Serialize;

use crate::features::FeatureSet;
use crate::model::LayerWeights;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Context,
    Setup,
    Execution,
}

/// One weighted factor in the audit breakdown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Contribution {
    pub layer: Layer,
    pub factor: &'static str,
    pub weight: f64,
    pub value: f64,
    pub points: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerScores {
    pub context: f64,
    pub setup: f64,
    pub execution: f64,
    pub base_score: f64,
}

pub fn score_layers(f: &FeatureSet, w: &LayerWeights) -> (LayerScores, Vec<Contribution>) {
    let context = [
        ("volFit", w.context.vol_fit, f.context.vol_fit),
        ("regimeAlignment", w.context.regime_alignment, f.context.regime_alignment),
        ("liquidity", w.context.liquidity, f.context.liquidity),
        ("dataFreshness", w.context.data_freshness, f.context.data_freshness),
        ("macroCalm", w.context.macro_calm, f.context.macro_calm),
    ];
    let setup = [
        ("directionalAgreement", w.setup.directional_agreement, f.setup.directional_agreement),
        ("breakevenFit", w.setup.breakeven_fit, f.setup.breakeven_fit),
        ("payoff", w.setup.payoff, f.setup.payoff),
        ("tfConfluence", w.setup.tf_confluence, f.setup.tf_confluence),
        ("pWinProxy", w.setup.p_win_proxy, f.setup.p_win_proxy),
    ];
    let execution = [
        ("liquidity", w.execution.liquidity, f.execution.liquidity),
        ("fillQuality", w.execution.fill_quality, f.execution.fill_quality),
        ("dteSuitability", w.execution.dte_suitability, f.execution.dte_suitability),
        ("riskReward", w.execution.risk_reward, f.execution.risk_reward),
        ("timeWindowFit", w.execution.time_window_fit, f.execution.time_window_fit),
    ];

    let mut contrib = Vec::with_capacity(15);
    let mut layer = |which: Layer, base_weight: f64, factors: &[(&'static str, f64, f64)]| {
        let mut raw = 0.0;
        for &(factor, weight, value) in factors {
            raw += weight * value;
            contrib.push(Contribution {
                layer: which,
                factor,
                weight,
                value,
                points: base_weight * weight * value * 100.0,
            });
        }
        clamp_score(raw * 100.0)
    };

    let context = layer(Layer::Context, w.base.context, &context);
    let setup = layer(Layer::Setup, w.base.setup, &setup);
    let execution = layer(Layer::Execution, w.base.execution, &execution);

    let base_score = clamp_score(
        w.base.context * context + w.base.setup * setup + w.base.execution * execution,
    );

    (
        LayerScores {
            context,
            setup,
            execution,
            base_score,
        },
        contrib,
    )
}

/// Scores live in [0, 100]; NaN reads as 0.
fn clamp_score(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 100.0) }
}
