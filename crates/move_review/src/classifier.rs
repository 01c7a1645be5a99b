//! Move-quality classification: throws and missed opportunities
//!
//! A move is judged by the change of the mover's own score between two of
//! their consecutive moves. Whether the drop counts as a throw or a missed
//! opportunity depends only on the score before it.

use chess_core::{MoveEvaluation, Participant};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Early,
    Mid,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Throw,
    MissedOpportunity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Small,
    Massive,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Early, Phase::Mid, Phase::Late];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Early => "early",
            Phase::Mid => "mid",
            Phase::Late => "late",
        }
    }
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Throw, Category::MissedOpportunity];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Throw => "throw",
            Category::MissedOpportunity => "missed_opportunity",
        }
    }
}

impl Severity {
    pub const ALL: [Severity; 2] = [Severity::Small, Severity::Massive];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Small => "small",
            Severity::Massive => "massive",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive last ply of the early and mid phases; later plies are late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseCutoffs {
    pub early_end_move: u32,
    pub mid_end_move: u32,
}

impl PhaseCutoffs {
    pub fn phase_of(&self, move_number: u32) -> Phase {
        if move_number <= self.early_end_move {
            Phase::Early
        } else if move_number <= self.mid_end_move {
            Phase::Mid
        } else {
            Phase::Late
        }
    }
}

impl Default for PhaseCutoffs {
    fn default() -> Self {
        Self {
            early_end_move: 30,
            mid_end_move: 80,
        }
    }
}

/// Centipawn thresholds.
///
/// Callers must keep `variance_score_blunder < variance_score_massive_blunder`;
/// the classifier does not check it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreThresholds {
    /// Minimum drop that counts as an event.
    pub variance_score_blunder: i32,
    /// Minimum drop that counts as a massive event.
    pub variance_score_massive_blunder: i32,
    /// Highest score before the move that is still "not ahead".
    pub even_score_limit: i32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            variance_score_blunder: 150,
            variance_score_massive_blunder: 400,
            even_score_limit: 100,
        }
    }
}

/// Classify one transition of the mover's score. Scores are from the mover's side.
pub fn classify_transition(
    before: i32,
    after: i32,
    thresholds: &ScoreThresholds,
) -> Option<(Category, Severity)> {
    let delta = after - before;
    if delta > -thresholds.variance_score_blunder {
        return None;
    }

    let category = if before <= thresholds.even_score_limit {
        Category::Throw
    } else {
        Category::MissedOpportunity
    };
    let severity = if delta <= -thresholds.variance_score_massive_blunder {
        Severity::Massive
    } else {
        Severity::Small
    };
    Some((category, severity))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    pub game_id: String,
    pub player: String,
    /// Ply of the move that caused the drop.
    pub move_number: u32,
    pub phase: Phase,
    pub category: Category,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveClassifier {
    pub thresholds: ScoreThresholds,
    pub phases: PhaseCutoffs,
}

impl MoveClassifier {
    pub fn new(thresholds: ScoreThresholds, phases: PhaseCutoffs) -> Self {
        Self { thresholds, phases }
    }

    /// Events for `player` in one game's evaluations (ordered by move number).
    pub fn classify_game(
        &self,
        evaluations: &[MoveEvaluation],
        player: &Participant,
    ) -> Vec<ClassifiedEvent> {
        let own: Vec<&MoveEvaluation> = evaluations
            .iter()
            .filter(|e| e.mover() == player.color)
            .collect();

        own.windows(2)
            .filter_map(|pair| {
                let (prev, next) = (pair[0], pair[1]);
                let before = prev.score_for(player.color);
                let after = next.score_for(player.color);
                let (category, severity) = classify_transition(before, after, &self.thresholds)?;
                Some(ClassifiedEvent {
                    game_id: next.game_id.clone(),
                    player: player.username.clone(),
                    move_number: next.move_number,
                    phase: self.phases.phase_of(next.move_number),
                    category,
                    severity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod classifier_tests;
