use serde::Serialize;

use chain::StrategyType;
use scoring::LayerScores;
use scoring::features::FeatureSet;

use crate::gate::{GateVerdict, Grade};

/// Human-readable summary of one payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explain {
    pub one_liner: String,
    pub bullets: Vec<String>,
}

/// One line plus two or three bullets: layer breakdown, execution metrics,
/// and blockers if any, else warnings if any.
pub fn explain(
    strategy_type: StrategyType,
    verdict: &GateVerdict,
    grade: &Grade,
    layers: &LayerScores,
    features: &FeatureSet,
) -> Explain {
    let one_liner = format!(
        "{} {} @ {}% confidence",
        strategy_type, verdict.state, grade.confidence
    );

    let mut bullets = vec![
        format!(
            "Layers: context {:.0}, setup {:.0}, execution {:.0} (base {:.0})",
            layers.context, layers.setup, layers.execution, layers.base_score
        ),
        format!(
            "Liquidity {:.0}%, fill quality {:.0}%, DTE fit {:.0}%",
            features.execution.liquidity * 100.0,
            features.execution.fill_quality * 100.0,
            features.execution.dte_suitability * 100.0
        ),
    ];

    if !verdict.blockers.is_empty() {
        bullets.push(format!("Blocked: {}", verdict.blockers.join(", ")));
    } else if !verdict.warnings.is_empty() {
        bullets.push(format!("Warnings: {}", verdict.warnings.join(", ")));
    }

    Explain { one_liner, bullets }
}
