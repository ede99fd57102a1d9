//! Scoring pipeline.
//!
//! generator -> features -> layers -> gate -> explainer per candidate, then a
//! single stable ranking pass. Buckets (one per surviving expiry) are scored in
//! parallel and collected in expiry order, so identical input always yields
//! identical output regardless of thread scheduling.

use chain::{Candidate, OptionType};
use rayon::prelude::*;
use scoring::{FeatureExtractor, GateConfig, ScoreInput, ScoringModel, score_layers};
use serde::Serialize;
use serde_json::Value;
use tracing::{Span, debug, field, info, instrument, trace};

use crate::error::EngineError;
use crate::explain::explain;
use crate::gate::Gate;
use crate::payload::{Bias, Evidence, Permission, ScoredPayload, Scores};
use crate::rank::rank;

/// Per-call filters. `Default` filters nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanOptions {
    /// Drop payloads whose gated final score is below this.
    pub min_final_score: Option<u8>,
    /// Restrict to structures built from one side of the chain.
    pub contract_type: Option<OptionType>,
}

/// A symbol that produced nothing, and why.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SymbolIssue {
    pub symbol: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UniverseScan {
    pub results: Vec<ScoredPayload>,
    pub issues: Vec<SymbolIssue>,
}

#[derive(Clone, Debug)]
pub struct ScoringEngine {
    model: ScoringModel,
    gate: GateConfig,
}

/// Everything that is shared by the candidates of one request.
struct Request<'e> {
    input: &'e ScoreInput,
    features: FeatureExtractor<'e>,
    gate: Gate<'e>,
    bias: Bias,
    time_window_fit: f64,
}

impl ScoringEngine {
    /// Fails if the gate contract is out of range.
    pub fn new(model: ScoringModel, gate: GateConfig) -> Result<Self, EngineError> {
        gate.validate()?;
        Ok(Self { model, gate })
    }

    pub fn with_default_model(gate: GateConfig) -> Result<Self, EngineError> {
        Self::new(ScoringModel::default(), gate)
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    pub fn gate_config(&self) -> &GateConfig {
        &self.gate
    }

    /// Score and rank every candidate for one underlying.
    ///
    /// Never fails: unusable rows are skipped, degraded data surfaces as
    /// blockers, and an empty chain yields an empty list.
    #[instrument(
        target = "engine",
        skip_all,
        fields(
            symbol = %input.symbol,
            rows = input.raw_rows.len(),
            candidates = field::Empty,
            kept = field::Empty
        )
    )]
    pub fn score(&self, input: &ScoreInput, opts: &ScanOptions) -> Vec<ScoredPayload> {
        let input = input.clone().clamped();
        let as_of = input.as_of_or_today();
        let snapshot = input.snapshot(as_of);
        let generator = &self.model.generator;

        let features = FeatureExtractor::new(&self.model, &input);
        let request = Request {
            input: &input,
            bias: Bias::from_market(
                input.market_direction,
                input.tf_confluence_score / 100.0,
                input.market_regime_alignment,
            ),
            time_window_fit: features.time_window_fit(),
            features,
            gate: Gate::new(&self.model, &self.gate, &input),
        };

        let buckets = snapshot.buckets(generator);
        debug!(%as_of, buckets = buckets.len(), "expiry buckets selected");

        let per_bucket: Vec<Vec<ScoredPayload>> = buckets
            .par_iter()
            .map(|bucket| {
                snapshot
                    .candidates_for(bucket, generator, opts.contract_type)
                    .into_iter()
                    .map(|c| self.assemble(&request, c))
                    .collect()
            })
            .collect();

        let generated: usize = per_bucket.iter().map(Vec::len).sum();

        let mut out: Vec<ScoredPayload> = per_bucket
            .into_iter()
            .flatten()
            .filter(|p| opts.min_final_score.is_none_or(|min| p.scores.final_score >= min))
            .collect();

        rank(&mut out);

        Span::current().record("candidates", generated);
        Span::current().record("kept", out.len());
        debug!("candidates scored and ranked");

        out
    }

    /// Score many underlyings independently and merge into one ranking.
    ///
    /// A symbol that yields nothing is reported in `issues` instead of failing
    /// the batch.
    #[instrument(target = "engine", skip_all, fields(symbols = inputs.len()))]
    pub fn scan_universe(&self, inputs: &[ScoreInput], opts: &ScanOptions) -> UniverseScan {
        let scored: Vec<(&ScoreInput, Vec<ScoredPayload>)> = inputs
            .par_iter()
            .map(|input| (input, self.score(input, opts)))
            .collect();

        let mut scan = UniverseScan::default();

        for (input, payloads) in scored {
            if payloads.is_empty() {
                scan.issues.push(SymbolIssue {
                    symbol: input.symbol.clone(),
                    reason: empty_reason(input).to_string(),
                });
                continue;
            }
            scan.results.extend(payloads);
        }

        rank(&mut scan.results);

        info!(
            results = scan.results.len(),
            issues = scan.issues.len(),
            "universe scan complete"
        );

        scan
    }

    fn assemble(&self, req: &Request<'_>, candidate: Candidate) -> ScoredPayload {
        let features = req.features.extract(&candidate);
        let (layers, contrib) = score_layers(&features, &self.model.weights);
        let verdict = req.gate.evaluate(&candidate, &features);
        let grade = req.gate.grade(layers.base_score, verdict.state);
        let explain = explain(candidate.strategy_type, &verdict, &grade, &layers, &features);

        trace!(
            strategy = %candidate.strategy_type,
            dte = candidate.dte,
            state = %verdict.state,
            blockers = verdict.blockers.len(),
            warnings = verdict.warnings.len(),
            base_score = layers.base_score,
            final_score = grade.final_score,
            "candidate gated"
        );

        ScoredPayload {
            version: ScoredPayload::VERSION,
            symbol: req.input.symbol.clone(),
            timeframe: req.input.timeframe.clone(),
            strategy_type: candidate.strategy_type,
            bias: req.bias.clone(),
            permission: Permission::from(verdict),
            scores: Scores::new(
                &layers,
                &grade,
                req.input.tf_confluence_score,
                req.time_window_fit,
            ),
            features,
            contrib,
            evidence: Evidence::new(candidate),
            explain,
        }
    }
}

fn empty_reason(input: &ScoreInput) -> &'static str {
    if input.raw_rows.is_empty() {
        "no option rows supplied"
    } else if !(input.spot.is_finite() && input.spot > 0.0) {
        "spot must be positive"
    } else {
        "no candidates survived tenor, moneyness and score filters"
    }
}

/// Decode one `ScoreInput` object or an array of them.
pub fn decode_inputs(json: &str) -> Result<Vec<ScoreInput>, EngineError> {
    let value: Value = serde_json::from_str(json)?;
    let inputs = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(inputs)
}
