//! Main-line reading of PGN text.
//!
//! Tag pairs are collected and every main-line move is played on a board as
//! it is read, so each move carries its UCI form. Comments are attached to the
//! move they follow. Variations, NAGs, move numbers and the result token are
//! dropped. Reading stops keeping moves at the first one that is not legal in
//! the position reached so far.

use std::io;
use std::mem;

use pgn_reader::{BufferedReader, RawComment, RawHeader, SanPlus, Skip, Visitor};
use thiserror::Error;

use crate::replay::{Replay, ReplayError, ReplayedMove, Replayer};

#[derive(Debug, Error)]
pub enum PgnError {
    #[error("no game in PGN text")]
    NoGame,
    #[error("failed to read PGN text: {0}")]
    Io(#[from] io::Error),
}

/// One legal main-line move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnMove {
    pub played: ReplayedMove,
    /// Text of the `{...}` comments that follow the move, joined by a space.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPgn {
    pub headers: Vec<(String, String)>,
    pub moves: Vec<PgnMove>,
    pub stopped: Option<ReplayError>,
}

impl ParsedPgn {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn sans(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.played.san.clone()).collect()
    }

    pub fn into_replay(self) -> Replay {
        Replay {
            moves: self.moves.into_iter().map(|m| m.played).collect(),
            stopped: self.stopped,
        }
    }
}

#[derive(Default)]
struct MainLine {
    headers: Vec<(String, String)>,
    replayer: Replayer,
    comments: Vec<Option<String>>,
    variation_depth: usize,
}

impl Visitor for MainLine {
    type Result = ParsedPgn;

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        self.headers.push((
            String::from_utf8_lossy(key).into_owned(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        ));
    }

    fn san(&mut self, san_plus: SanPlus) {
        if self.variation_depth > 0 {
            return;
        }
        if self.replayer.play(&san_plus.san, san_plus.to_string()) {
            self.comments.push(None);
        }
    }

    fn comment(&mut self, comment: RawComment<'_>) {
        if self.variation_depth > 0 || self.replayer.is_stopped() {
            return;
        }
        let text = String::from_utf8_lossy(comment.as_bytes());
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        // A comment before the first move belongs to the game, not a move.
        if let Some(slot) = self.comments.last_mut() {
            match slot {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(text);
                }
                None => *slot = Some(text.to_string()),
            }
        }
    }

    fn begin_variation(&mut self) -> Skip {
        self.variation_depth += 1;
        Skip(false)
    }

    fn end_variation(&mut self) {
        self.variation_depth = self.variation_depth.saturating_sub(1);
    }

    fn end_game(&mut self) -> Self::Result {
        let replay = mem::take(&mut self.replayer).finish();
        let comments = mem::take(&mut self.comments);
        ParsedPgn {
            headers: mem::take(&mut self.headers),
            moves: replay
                .moves
                .into_iter()
                .zip(comments)
                .map(|(played, comment)| PgnMove { played, comment })
                .collect(),
            stopped: replay.stopped,
        }
    }
}

/// Read the first game in `text`.
pub fn parse_pgn(text: &str) -> Result<ParsedPgn, PgnError> {
    let mut reader = BufferedReader::new(text.as_bytes());
    let mut visitor = MainLine::default();
    reader.read_game(&mut visitor)?.ok_or(PgnError::NoGame)
}

#[cfg(test)]
#[path = "pgn_tests.rs"]
mod pgn_tests;
