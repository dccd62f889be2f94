use thiserror::Error;

use crate::session::Phase;

/// Failures raised by the drill engine. None of these are retried: spots are
/// static data, so repeating the call yields the same result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown action '{0}' (expected fold, call or raise)")]
    InvalidAction(String),
    #[error("spot has neither a strategy nor EVs to resolve a reference action")]
    NoStrategy,
    #[error("spot pool is empty")]
    EmptyPool,
    #[error("session is {actual:?}, expected {expected:?}")]
    UnexpectedPhase { expected: Phase, actual: Phase },
    #[error("invalid card token '{0}'")]
    InvalidCard(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed spot table: {0}")]
    SpotFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
