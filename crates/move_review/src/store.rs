//! SQLite access: game source, processed sinks and the unprocessed-game selector

use chrono::DateTime;
use chess_core::{Game, MoveEvaluation};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{PipelineError, Result};

/// Whether a sink table exists yet.
///
/// Decided by a single existence check in the same transaction as the query that
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// First run: nothing has been written to this sink.
    Missing,
    Present,
}

type GameRow = (String, String, String, i64, String, String);

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    tables: StoreConfig,
}

impl SqliteStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        info!(url = %config.database_url, "Connected to database");
        Ok(Self::from_pool(pool, config.clone()))
    }

    pub fn from_pool(pool: SqlitePool, tables: StoreConfig) -> Self {
        Self { pool, tables }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn tables(&self) -> &StoreConfig {
        &self.tables
    }

    /// Create the source table if it does not exist.
    ///
    /// Games are ingested by another process; this only gives a fresh
    /// database the shape that process writes. One game may appear once per
    /// tracked participant, so `game_id` is not unique.
    pub async fn ensure_source_table(&self) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                game_id TEXT NOT NULL,
                pgn TEXT,
                rules TEXT NOT NULL,
                end_time INTEGER NOT NULL,
                white TEXT NOT NULL,
                black TEXT NOT NULL
            )",
            self.tables.games_table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Append raw games to the source table.
    pub async fn insert_games(&self, games: &[Game]) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (game_id, pgn, rules, end_time, white, black) VALUES (?, ?, ?, ?, ?, ?)",
            self.tables.games_table
        );
        let mut tx = self.pool.begin().await?;
        for game in games {
            sqlx::query(&sql)
                .bind(&game.game_id)
                .bind(&game.pgn)
                .bind(&game.rules)
                .bind(game.end_time.timestamp())
                .bind(&game.white)
                .bind(&game.black)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn sink_state(&self, sink_table: &str) -> Result<SinkState> {
        let mut conn = self.pool.acquire().await?;
        detect_sink(&mut conn, sink_table).await
    }

    /// Up to `limit` standard-chess games with move text that have no rows
    /// in `sink_table`, most recently ended first.
    ///
    /// A missing sink means nothing has been processed yet, so every eligible
    /// game qualifies. Store errors are returned as-is; there is no retry.
    pub async fn select_unprocessed(&self, sink_table: &str, limit: u32) -> Result<Vec<Game>> {
        let mut tx = self.pool.begin().await?;
        let state = detect_sink(&mut tx, sink_table).await?;

        let exclusion = match state {
            SinkState::Missing => String::new(),
            SinkState::Present => format!(
                "LEFT JOIN (SELECT DISTINCT game_id FROM {sink_table}) done
                   ON game.game_id = done.game_id"
            ),
        };
        let unprocessed = match state {
            SinkState::Missing => "",
            SinkState::Present => "AND done.game_id IS NULL",
        };
        let sql = format!(
            "SELECT game.game_id,
                    MAX(game.pgn),
                    MAX(game.rules),
                    MAX(game.end_time) AS last_end,
                    MAX(game.white),
                    MAX(game.black)
             FROM {games} game
             {exclusion}
             WHERE game.rules = ?
               AND LENGTH(game.pgn) > 0
               {unprocessed}
             GROUP BY game.game_id
             ORDER BY last_end DESC, game.game_id
             LIMIT ?",
            games = self.tables.games_table,
        );

        let rows: Vec<GameRow> = sqlx::query_as(&sql)
            .bind(Game::STANDARD_RULES)
            .bind(i64::from(limit))
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(sink = sink_table, ?state, selected = rows.len(), "Selected unprocessed games");
        rows.into_iter()
            .map(|row| game_from_row(&self.tables.games_table, row))
            .collect()
    }

    /// Distinct game ids present in a sink; empty when the sink does not exist.
    pub async fn processed_game_ids(&self, sink_table: &str) -> Result<Vec<String>> {
        let mut tx = self.pool.begin().await?;
        let ids = match detect_sink(&mut tx, sink_table).await? {
            SinkState::Missing => Vec::new(),
            SinkState::Present => {
                let sql = format!("SELECT DISTINCT game_id FROM {sink_table} ORDER BY game_id");
                sqlx::query_scalar(&sql).fetch_all(&mut *tx).await?
            }
        };
        tx.commit().await?;
        Ok(ids)
    }

    pub async fn load_game(&self, game_id: &str) -> Result<Option<Game>> {
        let sql = format!(
            "SELECT game_id, MAX(pgn), MAX(rules), MAX(end_time), MAX(white), MAX(black)
             FROM {} WHERE game_id = ? GROUP BY game_id",
            self.tables.games_table
        );
        let row: Option<GameRow> = sqlx::query_as(&sql)
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| game_from_row(&self.tables.games_table, row))
            .transpose()
    }

    /// Stored per-move scores of one game, in play order.
    pub async fn load_evaluations(&self, game_id: &str) -> Result<Vec<MoveEvaluation>> {
        let table = &self.tables.moves_table;
        let mut tx = self.pool.begin().await?;
        let rows: Vec<(String, i64, String, i64)> = match detect_sink(&mut tx, table).await? {
            SinkState::Missing => Vec::new(),
            SinkState::Present => {
                let sql = format!(
                    "SELECT game_id, move_number, move, score_white FROM {table}
                     WHERE game_id = ? ORDER BY move_number"
                );
                sqlx::query_as(&sql).bind(game_id).fetch_all(&mut *tx).await?
            }
        };
        tx.commit().await?;

        rows.into_iter()
            .map(|(game_id, move_number, mv, score_white)| {
                Ok(MoveEvaluation {
                    game_id,
                    move_number: u32::try_from(move_number)
                        .map_err(|_| invalid_row(table, format!("move_number {move_number}")))?,
                    mv,
                    score_white: i32::try_from(score_white)
                        .map_err(|_| invalid_row(table, format!("score_white {score_white}")))?,
                })
            })
            .collect()
    }
}

async fn detect_sink(conn: &mut SqliteConnection, table: &str) -> Result<SinkState> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(table)
    .fetch_one(conn)
    .await?;

    Ok(if exists {
        SinkState::Present
    } else {
        SinkState::Missing
    })
}

fn game_from_row(table: &str, row: GameRow) -> Result<Game> {
    let (game_id, pgn, rules, end_time, white, black) = row;
    let end_time = DateTime::from_timestamp(end_time, 0)
        .ok_or_else(|| invalid_row(table, format!("end_time {end_time} of game {game_id}")))?;
    Ok(Game {
        game_id,
        pgn,
        rules,
        end_time,
        white,
        black,
    })
}

fn invalid_row(table: &str, reason: String) -> PipelineError {
    PipelineError::InvalidRow {
        table: table.to_string(),
        reason,
    }
}
