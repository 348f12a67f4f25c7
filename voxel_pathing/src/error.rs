// Error types for the pathing engine.
//
// Only environmental and caller-facing failures live here. Search outcomes
// (goal reached, partial segment, exhausted, cancelled) are ordinary values
// carried by `SearchOutcome` in `pathfinding.rs`, and movement failures are
// carried by `FailureReason` in `movement.rs`; neither is an error.
//
// See also: `config.rs` (the main producer of `ConfigError`), `path.rs`
// (contiguity validation), `orchestrator.rs` (worker pool construction).

use crate::types::BlockPos;
use std::path::PathBuf;
use thiserror::Error;

/// Problems loading or overriding a `PathingConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown config key `{0}`")]
    UnknownKey(String),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Errors surfaced by the engine's public constructors and path builders.
#[derive(Debug, Error)]
pub enum PathingError {
    #[error("movement {index} ends at {end} but the next one starts at {start}")]
    Discontiguous {
        index: usize,
        end: BlockPos,
        start: BlockPos,
    },

    #[error("first movement starts at {actual}, expected path source {expected}")]
    WrongSource { expected: BlockPos, actual: BlockPos },

    #[error("failed to build search worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type PathingResult<T> = Result<T, PathingError>;
