use chess_core::Color;

/// Default magnitude every forced mate is mapped to.
pub const DEFAULT_MATE_SCORE: i32 = 1000;

/// Score as reported by the engine, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScore {
    Centipawns(i32),
    /// Mate in N moves; negative or zero when the side to move gets mated.
    Mate(i32),
}

impl EngineScore {
    /// Score for the side to move, with any mate collapsed to `±mate_score`.
    ///
    /// Mate distance is discarded, so "mate in 1" and "mate in 9" compare
    /// equal. Callers rely on this to keep scores totally ordered.
    pub fn side_relative(self, mate_score: i32) -> i32 {
        match self {
            EngineScore::Centipawns(cp) => cp,
            EngineScore::Mate(n) if n > 0 => mate_score,
            EngineScore::Mate(_) => -mate_score,
        }
    }

    /// Score from White's point of view given who is to move.
    pub fn white_relative(self, side_to_move: Color, mate_score: i32) -> i32 {
        self.side_relative(mate_score) * side_to_move.sign()
    }
}
