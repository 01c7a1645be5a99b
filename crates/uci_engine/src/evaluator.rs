//! Per-game move evaluation.
//!
//! A game is first replayed on the board so that unreadable move text never
//! costs an engine process. The engine is then acquired for the game, asked
//! for a score after every half-move in play order, and released on every
//! exit path.

use async_trait::async_trait;
use chess_core::{replay_pgn, Color, MoveEvaluation, ReplayError, ReplayedMove};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::limits::StopSignal;
use crate::score::{EngineScore, DEFAULT_MATE_SCORE};

/// Something that can score positions, usually a UCI engine process.
///
/// One analyzer serves exactly one game and is never shared.
#[async_trait]
pub trait Analyzer: Send {
    fn name(&self) -> &str;

    /// Score the position after `moves` (UCI, from the start position),
    /// relative to the side to move.
    async fn analyse(&mut self, moves: &[String]) -> Result<EngineScore, EngineError>;

    /// Release the analyzer after a successful game.
    async fn shutdown(&mut self) -> Result<(), EngineError>;

    /// Release the analyzer after a failure; must not block on the analyzer.
    async fn abort(&mut self);
}

/// Creates a fresh [`Analyzer`] for each game.
#[async_trait]
pub trait AnalyzerLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Analyzer>, EngineError>;
}

/// What happened to one game.
#[derive(Debug)]
pub enum GameOutcome {
    /// Every move was replayed and scored.
    Complete(Vec<MoveEvaluation>),
    /// Replay stopped at an illegal move; the legal prefix was scored.
    Truncated {
        evaluations: Vec<MoveEvaluation>,
        error: ReplayError,
    },
    /// Not a single move could be replayed.
    Unparseable { reason: String },
    /// The engine failed; nothing from this game is kept.
    EngineFailed {
        error: EngineError,
        moves_scored: usize,
    },
    /// The run was stopped before this game finished.
    Interrupted { moves_scored: usize },
}

impl GameOutcome {
    /// Evaluations to be recorded for this game.
    pub fn evaluations(&self) -> &[MoveEvaluation] {
        match self {
            GameOutcome::Complete(evaluations) | GameOutcome::Truncated { evaluations, .. } => {
                evaluations
            }
            _ => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GameOutcome::Complete(_) => "complete",
            GameOutcome::Truncated { .. } => "truncated",
            GameOutcome::Unparseable { .. } => "unparseable",
            GameOutcome::EngineFailed { .. } => "engine_failed",
            GameOutcome::Interrupted { .. } => "interrupted",
        }
    }
}

enum Abort {
    Engine(EngineError, usize),
    Interrupted(usize),
}

pub struct EngineEvaluator<L> {
    launcher: L,
    mate_score: i32,
    stop: StopSignal,
}

impl<L: AnalyzerLauncher> EngineEvaluator<L> {
    pub fn new(launcher: L, stop: StopSignal) -> Self {
        Self {
            launcher,
            mate_score: DEFAULT_MATE_SCORE,
            stop,
        }
    }

    pub fn with_mate_score(mut self, mate_score: i32) -> Self {
        self.mate_score = mate_score;
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Evaluate one game. Never fails: every problem is folded into the outcome.
    pub async fn evaluate(&self, game_id: &str, pgn: &str) -> GameOutcome {
        if self.stop.is_stopped() {
            return GameOutcome::Interrupted { moves_scored: 0 };
        }

        let replay = match replay_pgn(pgn) {
            Ok(replay) => replay,
            Err(e) => {
                warn!(game_id, error = %e, "failed to parse move text");
                return GameOutcome::Unparseable {
                    reason: e.to_string(),
                };
            }
        };
        if replay.moves.is_empty() {
            let reason = replay
                .stopped
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no moves".to_string());
            warn!(game_id, %reason, "failed to parse move text");
            return GameOutcome::Unparseable { reason };
        }

        let mut engine = match self.launcher.launch().await {
            Ok(engine) => engine,
            Err(error) => {
                warn!(game_id, error = %error, "failed to start engine");
                return GameOutcome::EngineFailed {
                    error,
                    moves_scored: 0,
                };
            }
        };

        let scored = self
            .score_moves(engine.as_mut(), game_id, &replay.moves)
            .await;
        match &scored {
            Ok(_) => {
                if let Err(e) = engine.shutdown().await {
                    warn!(game_id, error = %e, "engine did not shut down cleanly");
                }
            }
            Err(_) => engine.abort().await,
        }

        match (scored, replay.stopped) {
            (Ok(evaluations), None) => GameOutcome::Complete(evaluations),
            (Ok(evaluations), Some(error)) => {
                warn!(game_id, error = %error, "replay truncated");
                GameOutcome::Truncated { evaluations, error }
            }
            (Err(Abort::Engine(error, moves_scored)), _) => {
                warn!(game_id, moves_scored, error = %error, "engine failed, game discarded");
                GameOutcome::EngineFailed {
                    error,
                    moves_scored,
                }
            }
            (Err(Abort::Interrupted(moves_scored)), _) => {
                debug!(game_id, moves_scored, "game abandoned on stop request");
                GameOutcome::Interrupted { moves_scored }
            }
        }
    }

    async fn score_moves(
        &self,
        engine: &mut dyn Analyzer,
        game_id: &str,
        moves: &[ReplayedMove],
    ) -> Result<Vec<MoveEvaluation>, Abort> {
        let uci: Vec<String> = moves.iter().map(|m| m.uci.clone()).collect();
        let mut evaluations = Vec::with_capacity(moves.len());

        for (idx, mv) in moves.iter().enumerate() {
            if self.stop.is_stopped() {
                return Err(Abort::Interrupted(idx));
            }

            let score = engine
                .analyse(&uci[..=idx])
                .await
                .map_err(|e| Abort::Engine(e, idx))?;
            // The side to move is the opponent of whoever just played.
            let side_to_move = Color::of_ply(mv.move_number).other();
            let score_white = score.white_relative(side_to_move, self.mate_score);

            debug!(game_id, move_number = mv.move_number, mv = %mv.uci, score_white, "scored move");
            evaluations.push(MoveEvaluation {
                game_id: game_id.to_string(),
                move_number: mv.move_number,
                mv: mv.uci.clone(),
                score_white,
            });
        }

        Ok(evaluations)
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod evaluator_tests;
