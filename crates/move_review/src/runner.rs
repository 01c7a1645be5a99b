//! Pipeline orchestration
//!
//! One run selects a batch of unprocessed games, evaluates them in a bounded
//! pool of engine workers, classifies the resulting scores for the tracked
//! players and commits everything in a single write. Per-game problems are
//! recorded in the report; store errors end the run.

use chess_core::{extract_clocks, parse_pgn, Game, Participant};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use uci_engine::{AnalyzerLauncher, EngineEvaluator, GameOutcome, StopSignal};

use crate::classifier::{ClassifiedEvent, MoveClassifier};
use crate::config::{PipelineConfig, ReviewConfig};
use crate::error::{PipelineError, Result};
use crate::results::{ClockReport, RunReport};
use crate::store::SqliteStore;
use crate::summary::SummaryBuilder;
use crate::writer::{BatchRecords, BatchWriter, ClockRow};

pub struct PipelineRunner<L> {
    store: SqliteStore,
    writer: BatchWriter,
    evaluator: EngineEvaluator<L>,
    classifier: MoveClassifier,
    pipeline: PipelineConfig,
    stop: StopSignal,
}

impl<L: AnalyzerLauncher> PipelineRunner<L> {
    pub fn new(config: &ReviewConfig, store: SqliteStore, launcher: L, stop: StopSignal) -> Self {
        let writer = BatchWriter::new(store.pool().clone(), store.tables().clone());
        let evaluator =
            EngineEvaluator::new(launcher, stop.clone()).with_mate_score(config.engine.mate_score);
        Self {
            store,
            writer,
            evaluator,
            classifier: config.classifier(),
            pipeline: config.pipeline.clone(),
            stop,
        }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Evaluate, classify and commit one batch of unprocessed games.
    pub async fn run_once(&self) -> Result<RunReport> {
        let mut report = RunReport::new();
        if self.stop.is_stopped() {
            report.finish();
            return Ok(report);
        }

        let moves_table = &self.store.tables().moves_table;
        let games = self
            .store
            .select_unprocessed(moves_table, self.pipeline.batch_size)
            .await?;
        report.selected = games.len();
        info!(
            selected = games.len(),
            concurrency = self.pipeline.concurrency,
            "Evaluating batch"
        );

        let mut outcomes: Vec<(usize, Game, GameOutcome)> = stream::iter(games.into_iter().enumerate())
            .map(|(idx, game)| async move {
                let outcome = self.evaluator.evaluate(&game.game_id, &game.pgn).await;
                info!(game_id = %game.game_id, outcome = outcome.kind(), moves = outcome.evaluations().len(), "Game done");
                (idx, game, outcome)
            })
            .buffer_unordered(self.pipeline.concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|(idx, _, _)| *idx);

        let mut records = BatchRecords::default();
        let mut summary = SummaryBuilder::new();
        for (_, game, outcome) in &outcomes {
            report.record_outcome(&game.game_id, outcome);
            let evaluations = outcome.evaluations();
            if evaluations.is_empty() {
                continue;
            }

            for player in self.tracked_players(game) {
                let events = self.classifier.classify_game(evaluations, &player);
                summary.add_game(&player.username, &game.game_id, &events);
                report.record_events(&events);
                records.events.extend(events);
            }
            records.evaluations.extend_from_slice(evaluations);
        }

        if self.stop.is_stopped() {
            info!(
                kept = report.evaluated(),
                "Stop requested, committing the games that finished"
            );
        }

        let written = self.writer.commit(&records).await?;
        report.moves_written = written.moves;
        report.events_written = written.events;
        report.players = summary.build();
        report.finish();

        info!(
            selected = report.selected,
            evaluated = report.evaluated(),
            unparseable = report.unparseable,
            engine_failures = report.engine_failures,
            events = report.events_written,
            "Run complete"
        );
        Ok(report)
    }

    /// Extract `[%clk]` readings for games missing from the times sink.
    ///
    /// Games without any clock annotation write nothing and stay eligible.
    pub async fn run_clocks(&self) -> Result<ClockReport> {
        let times_table = &self.store.tables().times_table;
        let games = self
            .store
            .select_unprocessed(times_table, self.pipeline.batch_size)
            .await?;

        let mut report = ClockReport {
            selected: games.len(),
            ..ClockReport::default()
        };
        let mut rows = Vec::new();
        for game in &games {
            let parsed = match parse_pgn(&game.pgn) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(game_id = %game.game_id, error = %e, "failed to parse move text");
                    continue;
                }
            };
            let readings = extract_clocks(&parsed);
            if !readings.is_empty() {
                report.games_with_clocks += 1;
            }
            rows.extend(readings.into_iter().map(|reading| ClockRow {
                game_id: game.game_id.clone(),
                reading,
            }));
        }

        report.rows_written = self.writer.commit_clocks(&rows).await?;
        info!(
            selected = report.selected,
            with_clocks = report.games_with_clocks,
            rows = report.rows_written,
            "Clock extraction complete"
        );
        Ok(report)
    }

    /// Recompute a stored game's events from its stored scores.
    pub async fn reclassify(&self, game_id: &str) -> Result<Vec<ClassifiedEvent>> {
        let game = self
            .store
            .load_game(game_id)
            .await?
            .ok_or_else(|| PipelineError::GameNotFound(game_id.to_string()))?;
        let evaluations = self.store.load_evaluations(game_id).await?;

        Ok(self
            .tracked_players(&game)
            .iter()
            .flat_map(|player| self.classifier.classify_game(&evaluations, player))
            .collect())
    }

    /// Players of `game` to classify: the configured ones, or both sides.
    fn tracked_players(&self, game: &Game) -> Vec<Participant> {
        let participants = game.participants();
        if self.pipeline.players.is_empty() {
            return participants.to_vec();
        }
        participants
            .into_iter()
            .filter(|p| {
                self.pipeline
                    .players
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(&p.username))
            })
            .collect()
    }
}
