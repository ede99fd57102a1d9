//! Ranking policy: executable ideas first, then by confidence, then by
//! execution quality.

use std::cmp::Ordering;

use crate::payload::ScoredPayload;

/// Total order used by `rank`:
///   1. permission rank ascending (ALLOW, WAIT, BLOCK)
///   2. confidence descending
///   3. execution layer score descending
pub fn compare(a: &ScoredPayload, b: &ScoredPayload) -> Ordering {
    a.permission
        .state
        .rank()
        .cmp(&b.permission.state.rank())
        .then_with(|| b.scores.confidence.cmp(&a.scores.confidence))
        .then_with(|| b.scores.execution.total_cmp(&a.scores.execution))
}

/// Stable: payloads with equal keys keep their incoming order.
pub fn rank(payloads: &mut [ScoredPayload]) {
    payloads.sort_by(compare);
}
