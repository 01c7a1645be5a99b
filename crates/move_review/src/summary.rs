//! Per-player game counts by event kind

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::classifier::{Category, ClassifiedEvent, Phase, Severity};

/// How many of a player's games contain at least one event of each kind.
///
/// Keys are `<category>_<severity>` (e.g. `throw_massive`) and
/// `<category>_<severity>_<phase>` (e.g. `missed_opportunity_small_late`).
/// Every key is present, with zero when no game matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: String,
    /// Games of this player that were scored in the batch.
    pub games: usize,
    pub games_with: BTreeMap<String, usize>,
}

impl PlayerSummary {
    fn empty(player: &str) -> Self {
        let mut games_with = BTreeMap::new();
        for category in Category::ALL {
            for severity in Severity::ALL {
                games_with.insert(key(category, severity, None), 0);
                for phase in Phase::ALL {
                    games_with.insert(key(category, severity, Some(phase)), 0);
                }
            }
        }
        Self {
            player: player.to_string(),
            games: 0,
            games_with,
        }
    }

    pub fn count(&self, category: Category, severity: Severity, phase: Option<Phase>) -> usize {
        self.games_with
            .get(&key(category, severity, phase))
            .copied()
            .unwrap_or(0)
    }
}

fn key(category: Category, severity: Severity, phase: Option<Phase>) -> String {
    match phase {
        Some(phase) => format!("{category}_{severity}_{phase}"),
        None => format!("{category}_{severity}"),
    }
}

/// Accumulates events game by game.
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    games: BTreeMap<String, BTreeSet<String>>,
    hits: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `player` had a scored game, with its events (possibly none).
    pub fn add_game(&mut self, player: &str, game_id: &str, events: &[ClassifiedEvent]) {
        self.games
            .entry(player.to_string())
            .or_default()
            .insert(game_id.to_string());

        let hits = self.hits.entry(player.to_string()).or_default();
        for event in events.iter().filter(|e| e.player == player) {
            for phase in [None, Some(event.phase)] {
                hits.entry(key(event.category, event.severity, phase))
                    .or_default()
                    .insert(event.game_id.clone());
            }
        }
    }

    pub fn build(self) -> Vec<PlayerSummary> {
        let mut hits = self.hits;
        self.games
            .into_iter()
            .map(|(player, games)| {
                let mut summary = PlayerSummary::empty(&player);
                summary.games = games.len();
                for (k, game_ids) in hits.remove(&player).unwrap_or_default() {
                    summary.games_with.insert(k, game_ids.len());
                }
                summary
            })
            .collect()
    }
}
