//! Shared fixtures: in-memory store, game builder and a scripted engine.

#![allow(dead_code)]

use async_trait::async_trait;
use chess_core::Game;
use chrono::DateTime;
use move_review::{SqliteStore, StoreConfig};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uci_engine::{Analyzer, AnalyzerLauncher, EngineError, EngineScore};

pub async fn memory_store() -> SqliteStore {
    // One connection that never closes, or the in-memory database is lost.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteStore::from_pool(pool, StoreConfig::default());
    store.ensure_source_table().await.unwrap();
    store
}

pub fn game(game_id: &str, pgn: &str, end_time: i64) -> Game {
    Game {
        game_id: game_id.to_string(),
        pgn: pgn.to_string(),
        rules: Game::STANDARD_RULES.to_string(),
        end_time: DateTime::from_timestamp(end_time, 0).unwrap(),
        white: "alice".to_string(),
        black: "bob".to_string(),
    }
}

type Script = dyn Fn(&[String]) -> Result<EngineScore, EngineError> + Send + Sync;

/// Launches analyzers that answer from a closure over the move list.
#[derive(Clone)]
pub struct ScriptedLauncher {
    script: Arc<Script>,
    pub launched: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl ScriptedLauncher {
    pub fn new(
        script: impl Fn(&[String]) -> Result<EngineScore, EngineError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Arc::new(script),
            launched: Arc::default(),
            released: Arc::default(),
        }
    }

    /// Every position scores zero.
    pub fn level() -> Self {
        Self::new(|_| Ok(EngineScore::Centipawns(0)))
    }

    /// White-relative score after ply N is `white[N - 1]`, or zero past the end.
    pub fn white_scores(white: Vec<i32>) -> Self {
        Self::new(move |moves| {
            let ply = moves.len();
            let score = white.get(ply - 1).copied().unwrap_or(0);
            // After White's move Black is to move, and the engine speaks for Black.
            Ok(EngineScore::Centipawns(if ply % 2 == 1 { -score } else { score }))
        })
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

struct ScriptedAnalyzer {
    script: Arc<Script>,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl Analyzer for ScriptedAnalyzer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn analyse(&mut self, moves: &[String]) -> Result<EngineScore, EngineError> {
        tokio::task::yield_now().await;
        (self.script)(moves)
    }

    async fn shutdown(&mut self) -> Result<(), EngineError> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn abort(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalyzerLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn Analyzer>, EngineError> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedAnalyzer {
            script: self.script.clone(),
            released: self.released.clone(),
        }))
    }
}
