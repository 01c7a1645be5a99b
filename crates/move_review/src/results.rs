//! Run reports: counts, failures and per-player summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uci_engine::GameOutcome;

use crate::classifier::ClassifiedEvent;
use crate::error::Result;
use crate::summary::PlayerSummary;

/// A game that produced no rows, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFailure {
    pub game_id: String,
    /// `unparseable`, `engine_failed`, `truncated` or `interrupted`
    pub kind: String,
    pub reason: String,
}

/// Outcome of one run of the move pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub selected: usize,
    /// Games fully replayed and scored
    pub complete: usize,
    /// Games scored up to an illegal move
    pub truncated: usize,
    pub unparseable: usize,
    pub engine_failures: usize,
    pub interrupted: usize,
    pub moves_written: usize,
    pub events_written: usize,
    /// Events by `<category>_<severity>`
    pub event_counts: BTreeMap<String, usize>,
    /// Games that were skipped or cut short
    pub failures: Vec<GameFailure>,
    pub players: Vec<PlayerSummary>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            selected: 0,
            complete: 0,
            truncated: 0,
            unparseable: 0,
            engine_failures: 0,
            interrupted: 0,
            moves_written: 0,
            events_written: 0,
            event_counts: BTreeMap::new(),
            failures: Vec::new(),
            players: Vec::new(),
        }
    }

    pub fn record_outcome(&mut self, game_id: &str, outcome: &GameOutcome) {
        let reason = match outcome {
            GameOutcome::Complete(_) => {
                self.complete += 1;
                return;
            }
            GameOutcome::Truncated { error, .. } => {
                self.truncated += 1;
                error.to_string()
            }
            GameOutcome::Unparseable { reason } => {
                self.unparseable += 1;
                reason.clone()
            }
            GameOutcome::EngineFailed {
                error,
                moves_scored,
            } => {
                self.engine_failures += 1;
                format!("{error} after {moves_scored} moves")
            }
            GameOutcome::Interrupted { moves_scored } => {
                self.interrupted += 1;
                format!("stopped after {moves_scored} moves")
            }
        };
        self.failures.push(GameFailure {
            game_id: game_id.to_string(),
            kind: outcome.kind().to_string(),
            reason,
        });
    }

    pub fn record_events(&mut self, events: &[ClassifiedEvent]) {
        for event in events {
            *self
                .event_counts
                .entry(format!("{}_{}", event.category, event.severity))
                .or_insert(0) += 1;
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Games whose evaluations were written
    pub fn evaluated(&self) -> usize {
        self.complete + self.truncated
    }

    /// Save report to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Move review ===\n\n");
        report.push_str(&format!(
            "Games: {} selected, {} evaluated ({} truncated), {} unparseable, {} engine failures, {} interrupted\n",
            self.selected,
            self.evaluated(),
            self.truncated,
            self.unparseable,
            self.engine_failures,
            self.interrupted
        ));
        report.push_str(&format!(
            "Rows written: {} moves, {} events\n",
            self.moves_written, self.events_written
        ));

        if !self.event_counts.is_empty() {
            report.push_str("\nEvents:\n");
            for (kind, count) in &self.event_counts {
                report.push_str(&format!("  {:<28} {:>6}\n", kind, count));
            }
        }

        if !self.players.is_empty() {
            report.push_str(&format!(
                "\n{:<20} {:>6} {:>8} {:>8} {:>8} {:>8}\n",
                "Player", "Games", "T-small", "T-mass", "M-small", "M-mass"
            ));
            report.push_str(&"-".repeat(64));
            report.push('\n');
            for player in &self.players {
                let get = |k: &str| player.games_with.get(k).copied().unwrap_or(0);
                report.push_str(&format!(
                    "{:<20} {:>6} {:>8} {:>8} {:>8} {:>8}\n",
                    player.player,
                    player.games,
                    get("throw_small"),
                    get("throw_massive"),
                    get("missed_opportunity_small"),
                    get("missed_opportunity_massive")
                ));
            }
        }

        if !self.failures.is_empty() {
            report.push_str("\nSkipped or cut short:\n");
            for failure in &self.failures {
                report.push_str(&format!(
                    "  {:<24} {:<14} {}\n",
                    failure.game_id, failure.kind, failure.reason
                ));
            }
        }

        report
    }

    pub fn print_report(&self) {
        println!("{}", self.generate_report());
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one run of the clock pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReport {
    pub selected: usize,
    pub games_with_clocks: usize,
    pub rows_written: usize,
}

impl ClockReport {
    pub fn generate_report(&self) -> String {
        format!(
            "=== Clock extraction ===\n\nGames: {} selected, {} with clock annotations\nRows written: {}\n",
            self.selected, self.games_with_clocks, self.rows_written
        )
    }
}
