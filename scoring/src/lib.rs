//! Multi-factor scoring for option strategy candidates.
//!
//! `features` turns a candidate plus market context into normalized [0, 1]
//! factors; `layers` reduces them into context / setup / execution layer
//! scores and a composite base score. All weights and ranges live in one
//! versioned `ScoringModel`; the externally owned gate contract lives in
//! `GateConfig`.

pub mod config;
pub mod features;
pub mod input;
pub mod layers;
pub mod model;
pub mod permission;

pub use config::{ConfigError, GateConfig, GateMultipliers, GateThresholds};
pub use features::{FeatureExtractor, FeatureSet};
pub use input::{Freshness, ScoreInput, TimeframeClass};
pub use layers::{Contribution, Layer, LayerScores, score_layers};
pub use model::ScoringModel;
pub use permission::PermissionState;
