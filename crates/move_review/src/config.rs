//! Typed pipeline configuration
//!
//! Loaded once from TOML at startup and validated before anything touches the
//! store or spawns an engine. Every section is optional and falls back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use uci_engine::{EngineCommand, SearchLimits};

use crate::classifier::{MoveClassifier, PhaseCutoffs, ScoreThresholds};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub store: StoreConfig,
    pub engine: EngineConfig,
    pub pipeline: PipelineConfig,
    pub phases: PhaseCutoffs,
    pub thresholds: ScoreThresholds,
}

/// Where games come from and where results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
    /// Source relation of raw games.
    pub games_table: String,
    /// Sink of per-move scores; also the processed marker for the move pipeline.
    pub moves_table: String,
    pub events_table: String,
    /// Sink of clock readings; the processed marker for the clock pipeline.
    pub times_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://move_review.db?mode=rwc".to_string(),
            games_table: "games".to_string(),
            moves_table: "games_moves".to_string(),
            events_table: "games_events".to_string(),
            times_table: "games_times".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    /// Think time per position.
    pub think_time_ms: u64,
    /// Extra time a search may take before the engine is considered hung.
    pub search_grace_ms: u64,
    pub handshake_timeout_ms: u64,
    /// Magnitude any forced mate is mapped to, regardless of distance.
    pub mate_score: i32,
    pub threads: u32,
    pub hash_mb: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            args: Vec::new(),
            think_time_ms: 100,
            search_grace_ms: 1000,
            handshake_timeout_ms: 10_000,
            mate_score: uci_engine::DEFAULT_MATE_SCORE,
            threads: 1,
            hash_mb: 16,
        }
    }
}

#[cfg(windows)]
fn default_engine_path() -> PathBuf {
    PathBuf::from(r"C:\Program Files\ChessEngines\stockfish\stockfish.exe")
}

#[cfg(not(windows))]
fn default_engine_path() -> PathBuf {
    PathBuf::from("/usr/games/stockfish")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Games selected per run.
    pub batch_size: u32,
    /// Engine processes running at the same time.
    pub concurrency: usize,
    /// Players to classify; both sides of every game when empty.
    pub players: Vec<String>,
    pub watch_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            concurrency: 1,
            players: Vec::new(),
            watch_interval_secs: 300,
        }
    }
}

impl ReviewConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ReviewConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.batch_size == 0 {
            return Err(invalid("pipeline.batch_size must be at least 1"));
        }
        if self.pipeline.concurrency == 0 {
            return Err(invalid("pipeline.concurrency must be at least 1"));
        }
        if self.engine.think_time_ms == 0 {
            return Err(invalid("engine.think_time_ms must be at least 1"));
        }
        if self.engine.mate_score <= 0 {
            return Err(invalid("engine.mate_score must be positive"));
        }
        if self.phases.early_end_move >= self.phases.mid_end_move {
            return Err(invalid(format!(
                "phases.early_end_move ({}) must be below phases.mid_end_move ({})",
                self.phases.early_end_move, self.phases.mid_end_move
            )));
        }

        let t = &self.thresholds;
        if t.variance_score_blunder <= 0 {
            return Err(invalid("thresholds.variance_score_blunder must be positive"));
        }
        if t.variance_score_blunder >= t.variance_score_massive_blunder {
            return Err(invalid(format!(
                "thresholds.variance_score_blunder ({}) must be below \
                 thresholds.variance_score_massive_blunder ({})",
                t.variance_score_blunder, t.variance_score_massive_blunder
            )));
        }

        let store = &self.store;
        for (key, name) in [
            ("store.games_table", &store.games_table),
            ("store.moves_table", &store.moves_table),
            ("store.events_table", &store.events_table),
            ("store.times_table", &store.times_table),
        ] {
            if !is_identifier(name) {
                return Err(invalid(format!("{key} is not a plain SQL identifier: {name:?}")));
            }
        }
        if store.games_table == store.moves_table || store.games_table == store.times_table {
            return Err(invalid("sink tables must differ from store.games_table"));
        }

        Ok(())
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            move_time: Duration::from_millis(self.engine.think_time_ms),
            grace: Duration::from_millis(self.engine.search_grace_ms),
            handshake: Duration::from_millis(self.engine.handshake_timeout_ms),
        }
    }

    pub fn engine_command(&self) -> EngineCommand {
        let command = self
            .engine
            .args
            .iter()
            .fold(EngineCommand::new(&self.engine.path), |cmd, arg| cmd.arg(arg.clone()));
        command
            .option("Threads", self.engine.threads)
            .option("Hash", self.engine.hash_mb)
    }

    pub fn classifier(&self) -> MoveClassifier {
        MoveClassifier::new(self.thresholds, self.phases)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// Table names are spliced into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is allowed.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
