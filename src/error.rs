//! Error types for equilibrium solving.

use thiserror::Error;

use crate::nlp::Status;

/// Errors raised while building or solving subproblems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A variable block was handed a vector of the wrong length.
    #[error("block `{block}` expects {expected} values, got {got}")]
    Dimension {
        block: String,
        expected: usize,
        got: usize,
    },

    /// Strategy data is not `n × 2`.
    #[error("strategy data of {rows} rows is not n × 2 (offending row length {cols})")]
    Shape { rows: usize, cols: usize },

    /// Flat strategy data whose length is not a multiple of 2.
    #[error("flat strategy data of length {0} does not split into 2-value rows")]
    FlatLength(usize),

    /// Start guess rows do not match the number of players.
    #[error("game has {expected} players, start guess has {got} rows")]
    PlayerCount { expected: usize, got: usize },

    /// A cost term refers to a block the problem does not hold.
    #[error("no variable block named `{0}`")]
    UnknownBlock(String),

    /// Engine option rejected.
    #[error("option `{key}`: {reason}")]
    Option { key: String, reason: String },

    /// Inner solve finished without meeting its tolerance (strict mode only).
    #[error("subproblem for player {player} in round {round} ended with {status:?}")]
    UnconvergedInner {
        player: usize,
        round: usize,
        status: Status,
    },

    /// Invalid model or scenario parameter.
    #[error("invalid parameter: {0}")]
    Parameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
