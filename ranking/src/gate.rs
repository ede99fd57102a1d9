//! Decides whether a scored candidate may be acted on.
//!
//! Hard blockers force BLOCK. Soft warnings accumulate; more than
//! `max_warnings_for_allow` of them turn ALLOW into WAIT. An external
//! time-window permission is then joined on the ALLOW < WAIT < BLOCK lattice.
//
//  Pure: no clock, no I/O.

use chain::{Candidate, Premium};
use scoring::features::FeatureSet;
use scoring::{Freshness, GateConfig, PermissionState, ScoreInput, ScoringModel};
use serde::Serialize;

pub mod blocker {
    pub const DATA_STALE_OR_MISSING: &str = "data_stale_or_missing";
    pub const SPREAD_TOO_WIDE: &str = "spread_too_wide";
    pub const OI_BELOW_MINIMUM: &str = "oi_below_minimum";
    pub const VOLUME_BELOW_MINIMUM: &str = "volume_below_minimum";
    pub const NON_POSITIVE_DEBIT: &str = "non_positive_debit";
    pub const CREDIT_TO_RISK_TOO_LOW: &str = "credit_to_risk_too_low";
}

pub mod warning {
    pub const TF_CONFLUENCE_WEAK: &str = "tf_confluence_weak";
    pub const FILL_QUALITY_LOW: &str = "fill_quality_low";
    pub const DTE_MISMATCH: &str = "dte_mismatch";
    pub const DIRECTION_OPPOSED: &str = "direction_opposed";
}

pub mod note {
    pub const TIME_WINDOW_WAIT: &str = "time_window_wait";
    pub const TIME_WINDOW_BLOCK: &str = "time_window_block";
}

/// Outcome of gating one candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GateVerdict {
    pub state: PermissionState,
    pub blockers: Vec<&'static str>,
    pub warnings: Vec<&'static str>,
    pub notes: Vec<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Low,
}

/// Score after the permission multiplier.
#[derive(Clone, Debug, PartialEq)]
pub struct Grade {
    pub gate_multiplier: f64,
    pub final_score: u8,
    pub confidence: u8,
    pub quality: Quality,
    pub tf_alignment: u8,
}

/// Request-scoped gate: thresholds plus the context that is the same for
/// every candidate of one `ScoreInput`.
#[derive(Clone, Debug)]
pub struct Gate<'a> {
    model: &'a ScoringModel,
    config: &'a GateConfig,
    data_stale: bool,
    time_permission: Option<PermissionState>,
    tf_confluence_score: f64,
}

impl<'a> Gate<'a> {
    /// `input` is expected to be `clamped()` already.
    pub fn new(model: &'a ScoringModel, config: &'a GateConfig, input: &ScoreInput) -> Self {
        Self {
            model,
            config,
            data_stale: is_data_stale(input, config),
            time_permission: input.time_permission,
            tf_confluence_score: input.tf_confluence_score,
        }
    }

    pub fn evaluate(&self, c: &Candidate, f: &FeatureSet) -> GateVerdict {
        let blockers = self.blockers(c);
        let warnings = self.warnings(f);

        let internal = if !blockers.is_empty() {
            PermissionState::Block
        } else if warnings.len() > self.model.warnings.max_warnings_for_allow {
            PermissionState::Wait
        } else {
            PermissionState::Allow
        };

        let state = internal.merge(self.time_permission);

        let mut notes = Vec::new();
        if state > internal {
            notes.push(match state {
                PermissionState::Block => note::TIME_WINDOW_BLOCK,
                _ => note::TIME_WINDOW_WAIT,
            });
        }

        GateVerdict {
            state,
            blockers,
            warnings,
            notes,
        }
    }

    /// Multiplier, final score, confidence and alignment for a gated base score.
    pub fn grade(&self, base_score: f64, state: PermissionState) -> Grade {
        let g = &self.model.grading;

        let gate_multiplier = self.config.multipliers.for_state(state);
        let final_score = (base_score * gate_multiplier).round().clamp(0.0, 100.0);
        let confidence = final_score.clamp(g.confidence_floor, g.confidence_ceiling);

        let quality = if confidence >= g.high_quality_at {
            Quality::High
        } else if confidence >= g.medium_quality_at {
            Quality::Medium
        } else {
            Quality::Low
        };

        Grade {
            gate_multiplier,
            final_score: final_score as u8,
            confidence: confidence as u8,
            quality,
            tf_alignment: tf_alignment(self.tf_confluence_score, &g.tf_alignment_cuts),
        }
    }

    fn blockers(&self, c: &Candidate) -> Vec<&'static str> {
        let t = &self.config.thresholds;
        let mut out = Vec::new();

        if self.data_stale {
            out.push(blocker::DATA_STALE_OR_MISSING);
        }
        if c.legs.iter().any(|l| l.spread_pct() > t.max_spread_pct) {
            out.push(blocker::SPREAD_TOO_WIDE);
        }
        if c.legs.iter().any(|l| l.open_interest < t.min_open_interest) {
            out.push(blocker::OI_BELOW_MINIMUM);
        }
        if c.legs.iter().any(|l| l.volume < t.min_volume) {
            out.push(blocker::VOLUME_BELOW_MINIMUM);
        }

        match c.premium {
            Premium::Debit(debit) if debit <= 0.0 => out.push(blocker::NON_POSITIVE_DEBIT),
            Premium::Credit(credit) if c.max_loss > 0.0 => {
                if credit / c.max_loss < t.min_credit_to_risk {
                    out.push(blocker::CREDIT_TO_RISK_TOO_LOW);
                }
            }
            _ => {}
        }

        out
    }

    fn warnings(&self, f: &FeatureSet) -> Vec<&'static str> {
        let w = &self.model.warnings;
        let mut out = Vec::new();

        if f.setup.tf_confluence < w.min_tf_confluence {
            out.push(warning::TF_CONFLUENCE_WEAK);
        }
        if f.execution.fill_quality < w.min_fill_quality {
            out.push(warning::FILL_QUALITY_LOW);
        }
        if f.execution.dte_suitability < w.min_dte_suitability {
            out.push(warning::DTE_MISMATCH);
        }
        if f.setup.directional_agreement == 0.0 {
            out.push(warning::DIRECTION_OPPOSED);
        }

        out
    }
}

/// STALE data always blocks; REALTIME data blocks once older than the
/// configured ceiling. Unknown age (non-finite input) counts as missing.
fn is_data_stale(input: &ScoreInput, config: &GateConfig) -> bool {
    match input.freshness {
        Freshness::Stale => true,
        Freshness::Realtime => {
            input.stale_seconds > config.thresholds.max_stale_seconds_realtime
        }
        Freshness::Delayed | Freshness::Eod => input.stale_seconds == f64::MAX,
    }
}

/// 4 / 3 / 2 / 1 from descending cut points.
pub fn tf_alignment(tf_confluence_score: f64, cuts: &[f64; 3]) -> u8 {
    let [strong, good, fair] = *cuts;
    if tf_confluence_score >= strong {
        4
    } else if tf_confluence_score >= good {
        3
    } else if tf_confluence_score >= fair {
        2
    } else {
        1
    }
}
