use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Side that played the given 1-based ply.
    pub fn of_ply(move_number: u32) -> Color {
        if move_number % 2 == 1 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Multiplier turning a White-relative score into this side's perspective.
    pub fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player seated at one side of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub username: String,
    pub color: Color,
}

/// Raw game as ingested from the source store. Never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub pgn: String,
    pub rules: String,
    pub end_time: DateTime<Utc>,
    pub white: String,
    pub black: String,
}

impl Game {
    /// Rule set of standard chess; every other variant is ignored.
    pub const STANDARD_RULES: &'static str = "chess";

    pub fn participants(&self) -> [Participant; 2] {
        [
            Participant {
                username: self.white.clone(),
                color: Color::White,
            },
            Participant {
                username: self.black.clone(),
                color: Color::Black,
            },
        ]
    }

    /// Color played by `username` in this game (usernames compare case-insensitively).
    pub fn color_of(&self, username: &str) -> Option<Color> {
        if self.white.eq_ignore_ascii_case(username) {
            Some(Color::White)
        } else if self.black.eq_ignore_ascii_case(username) {
            Some(Color::Black)
        } else {
            None
        }
    }
}

/// Engine verdict after one half-move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvaluation {
    pub game_id: String,
    /// 1-based ply counter.
    pub move_number: u32,
    /// Move in UCI notation.
    #[serde(rename = "move")]
    pub mv: String,
    /// Centipawns from White's point of view, mates normalized to a sentinel.
    pub score_white: i32,
}

impl MoveEvaluation {
    /// Side that played this move.
    pub fn mover(&self) -> Color {
        Color::of_ply(self.move_number)
    }

    pub fn score_for(&self, color: Color) -> i32 {
        self.score_white * color.sign()
    }
}
