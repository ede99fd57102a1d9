pub mod cli;

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use cli::*;
use common::logger::{LogFormat, TraceId, child_span, init_logger, root_span};
use ranking::{ScoringEngine, decode_inputs};
use scoring::GateConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logger("optscan", format);

    let trace_id = TraceId::default();
    let span = root_span("optscan", &trace_id);
    let _guard = span.enter();

    match cli.command {
        Command::Score(args) => run_score(&args),
    }
}

fn run_score(args: &ScoreArgs) -> anyhow::Result<()> {
    let span = child_span("score");
    let _guard = span.enter();

    let gate = load_gate_config(args.gate_config.as_deref())?;
    let engine = ScoringEngine::with_default_model(gate)?;

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("reading score input {}", args.input.display()))?;
    let inputs = decode_inputs(&raw).context("decoding score input")?;
    let opts = scan_options(args);
    let top = args.top.unwrap_or(usize::MAX);

    let output = match inputs.as_slice() {
        [single] => {
            span.record("symbol", single.symbol.as_str());
            let mut ranked = engine.score(single, &opts);
            ranked.truncate(top);
            info!(printed = ranked.len(), "scored one symbol");
            serde_json::to_value(&ranked)?
        }
        many => {
            let mut scan = engine.scan_universe(many, &opts);
            scan.results.truncate(top);
            serde_json::to_value(&scan)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// File when given, otherwise the OPTSCAN_* environment.
fn load_gate_config(path: Option<&Path>) -> anyhow::Result<GateConfig> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .with_context(|| format!("reading gate config {}", p.display()))?;
            GateConfig::from_json_str(&raw).with_context(|| format!("parsing {}", p.display()))
        }
        None => GateConfig::from_env().context("loading gate config from environment"),
    }
}
