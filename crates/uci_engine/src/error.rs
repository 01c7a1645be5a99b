use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to an engine process. All of them end the engine's session.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start engine {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine closed its output")]
    Closed,

    #[error("engine did not answer {stage} within {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    #[error("engine finished the search without reporting a score")]
    NoScore,
}
