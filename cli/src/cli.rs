use std::path::PathBuf;

use chain::OptionType;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ranking::ScanOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContractTypeCli {
    Call,
    Put,
}

#[derive(Debug, Parser)]
#[clap(name = "optscan", version)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[clap(long, global = true)]
    pub json_logs: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score and rank strategy candidates for one ScoreInput or an array of them
    Score(ScoreArgs),
}

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// ScoreInput JSON file (object, or array for a multi-symbol scan)
    #[clap(long)]
    pub input: PathBuf,

    /// Gate config JSON file; falls back to OPTSCAN_* environment variables
    #[clap(long)]
    pub gate_config: Option<PathBuf>,

    /// Drop candidates whose final score is below this
    #[clap(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_score: Option<u8>,

    /// Only structures built from calls or from puts
    #[clap(long, value_enum)]
    pub contract_type: Option<ContractTypeCli>,

    /// Print at most this many ranked candidates
    #[clap(long)]
    pub top: Option<usize>,
}

/// Convert CLI contract selection → chain option type
pub(crate) fn cli_to_option_type(c: ContractTypeCli) -> OptionType {
    match c {
        ContractTypeCli::Call => OptionType::Call,
        ContractTypeCli::Put => OptionType::Put,
    }
}

pub(crate) fn scan_options(args: &ScoreArgs) -> ScanOptions {
    ScanOptions {
        min_final_score: args.min_score,
        contract_type: args.contract_type.map(cli_to_option_type),
    }
}
