use scoring::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("gate config rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed score input: {0}")]
    Input(#[from] serde_json::Error),
}
