//! Option-chain side of the scanner: turns loosely typed chain rows into
//! canonical legs and enumerates bounded single/two-leg strategy candidates.

pub mod generator;
pub mod leg;
pub mod raw;
pub mod types;

pub use generator::{ChainSnapshot, ExpiryBucket, GeneratorConfig, Tenor, TenorBand};
pub use leg::{Leg, OptionType, Side};
pub use raw::RawContractRow;
pub use types::{Candidate, Direction, Premium, StrategyType};
