//! Gating, ranking and explanation of scored option strategy candidates, and
//! the `ScoringEngine` pipeline that drives generator -> features -> layers ->
//! gate -> ranker -> explainer for one or many underlyings.

pub mod engine;
pub mod error;
pub mod explain;
pub mod gate;
pub mod payload;
pub mod rank;

pub use engine::{ScanOptions, ScoringEngine, SymbolIssue, UniverseScan, decode_inputs};
pub use error::EngineError;
pub use explain::Explain;
pub use gate::{Gate, GateVerdict, Grade, Quality};
pub use payload::ScoredPayload;
pub use rank::{compare, rank};
