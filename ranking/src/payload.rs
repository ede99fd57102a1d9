//! Versioned output record, one per candidate.

use chain::{Candidate, Direction, Leg, StrategyType};
use scoring::features::FeatureSet;
use scoring::{Contribution, LayerScores, PermissionState, ScoringModel};
use serde::Serialize;

use crate::explain::Explain;
use crate::gate::{GateVerdict, Grade, Quality};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPayload {
    pub version: &'static str,
    pub symbol: String,
    pub timeframe: String,
    pub strategy_type: StrategyType,
    pub bias: Bias,
    pub permission: Permission,
    pub scores: Scores,
    pub features: FeatureSet,
    pub contrib: Vec<Contribution>,
    pub evidence: Evidence,
    pub explain: Explain,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bias {
    pub direction: Direction,
    /// [0, 100]
    pub strength: u8,
}

impl Bias {
    /// Directional markets lean by confluence and regime; neutral has no lean.
    pub fn from_market(direction: Direction, tf_confluence: f64, regime_alignment: f64) -> Self {
        let strength = match direction {
            Direction::Neutral => 0.0,
            _ => (60.0 * tf_confluence + 40.0 * regime_alignment)
                .round()
                .clamp(0.0, 100.0),
        };
        Self {
            direction,
            strength: strength as u8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Permission {
    pub state: PermissionState,
    pub blockers: Vec<&'static str>,
    pub warnings: Vec<&'static str>,
    pub notes: Vec<&'static str>,
}

impl From<GateVerdict> for Permission {
    fn from(v: GateVerdict) -> Self {
        Self {
            state: v.state,
            blockers: v.blockers,
            warnings: v.warnings,
            notes: v.notes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub context: f64,
    pub setup: f64,
    pub execution: f64,
    pub base_score: f64,
    pub gate_multiplier: f64,
    pub final_score: u8,
    pub confidence: u8,
    pub quality: Quality,
    pub tf_confluence_score: f64,
    pub tf_alignment: u8,
    pub time_window_fit: f64,
}

impl Scores {
    pub fn new(
        layers: &LayerScores,
        grade: &Grade,
        tf_confluence_score: f64,
        time_window_fit: f64,
    ) -> Self {
        Self {
            context: layers.context,
            setup: layers.setup,
            execution: layers.execution,
            base_score: layers.base_score,
            gate_multiplier: grade.gate_multiplier,
            final_score: grade.final_score,
            confidence: grade.confidence,
            quality: grade.quality,
            tf_confluence_score,
            tf_alignment: grade.tf_alignment,
            time_window_fit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Average share of tracked per-leg fields that resolved, in [0, 1].
    pub data_coverage: f64,
    pub candidate: Candidate,
}

impl Evidence {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            data_coverage: data_coverage(&candidate.legs),
            candidate,
        }
    }
}

pub fn data_coverage(legs: &[Leg]) -> f64 {
    if legs.is_empty() {
        return 0.0;
    }
    legs.iter().map(Leg::coverage).sum::<f64>() / legs.len() as f64
}

impl ScoredPayload {
    pub const VERSION: &'static str = ScoringModel::VERSION;
}
