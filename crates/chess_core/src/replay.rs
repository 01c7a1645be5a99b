//! Replay of a game's main line from the standard starting position.

use shakmaty::san::{San, SanError, SanPlus};
use shakmaty::{CastlingMode, Chess, Position};
use thiserror::Error;

use crate::pgn::{parse_pgn, PgnError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("not a SAN move")]
    Malformed,
    #[error("no legal move matches")]
    Illegal,
    #[error("more than one legal move matches")]
    Ambiguous,
}

impl From<SanError> for MoveError {
    fn from(err: SanError) -> Self {
        match err {
            SanError::AmbiguousSan => MoveError::Ambiguous,
            _ => MoveError::Illegal,
        }
    }
}

/// Replay stopped at `move_number`; everything before it was legal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("move {move_number} ({san}): {kind}")]
pub struct ReplayError {
    pub move_number: u32,
    pub san: String,
    pub kind: MoveError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedMove {
    /// 1-based ply.
    pub move_number: u32,
    pub san: String,
    pub uci: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replay {
    pub moves: Vec<ReplayedMove>,
    /// Why replay ended before the last written move, if it did.
    pub stopped: Option<ReplayError>,
}

impl Replay {
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }

    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.uci.clone()).collect()
    }
}

/// Plays SAN moves on a board until the first one that does not fit.
#[derive(Debug, Default)]
pub(crate) struct Replayer {
    pos: Chess,
    replay: Replay,
}

impl Replayer {
    pub(crate) fn is_stopped(&self) -> bool {
        self.replay.stopped.is_some()
    }

    /// Returns false once replay has stopped, including for this move.
    pub(crate) fn play(&mut self, san: &San, written: String) -> bool {
        if self.is_stopped() {
            return false;
        }
        let move_number = self.replay.moves.len() as u32 + 1;
        match san.to_move(&self.pos) {
            Ok(mv) => {
                let uci = mv.to_uci(CastlingMode::Standard).to_string();
                self.pos.play_unchecked(&mv);
                self.replay.moves.push(ReplayedMove {
                    move_number,
                    san: written,
                    uci,
                });
                true
            }
            Err(err) => {
                self.stop(written, err.into());
                false
            }
        }
    }

    pub(crate) fn stop(&mut self, san: String, kind: MoveError) {
        if self.is_stopped() {
            return;
        }
        self.replay.stopped = Some(ReplayError {
            move_number: self.replay.moves.len() as u32 + 1,
            san,
            kind,
        });
    }

    pub(crate) fn finish(self) -> Replay {
        self.replay
    }
}

/// Replay SAN moves, truncating at the first one that is not legal.
///
/// Trailing `!`/`?` annotations and check marks are accepted.
pub fn replay_san<S: AsRef<str>>(sans: &[S]) -> Replay {
    let mut replayer = Replayer::default();

    for text in sans {
        let text = text.as_ref();
        let bare = text.trim_end_matches(['!', '?']);
        match bare.parse::<SanPlus>() {
            Ok(san_plus) => {
                if !replayer.play(&san_plus.san, text.to_string()) {
                    break;
                }
            }
            Err(_) => {
                replayer.stop(text.to_string(), MoveError::Malformed);
                break;
            }
        }
    }

    replayer.finish()
}

pub fn replay_pgn(pgn: &str) -> Result<Replay, PgnError> {
    Ok(parse_pgn(pgn)?.into_replay())
}
