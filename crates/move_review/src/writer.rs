//! Batch writer: appends a processed batch to the sinks in one transaction

use chess_core::{ClockReading, MoveEvaluation};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::SqliteConnection;
use tracing::info;

use crate::classifier::ClassifiedEvent;
use crate::config::StoreConfig;
use crate::error::Result;

/// Everything a batch of games produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRecords {
    pub evaluations: Vec<MoveEvaluation>,
    pub events: Vec<ClassifiedEvent>,
}

impl BatchRecords {
    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty() && self.events.is_empty()
    }
}

/// A clock reading tagged with its game.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockRow {
    pub game_id: String,
    pub reading: ClockReading,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub moves: usize,
    pub events: usize,
}

/// Appends rows; never updates or deduplicates.
///
/// Each call is all-or-nothing: either every row is committed or the error is
/// returned and none are visible. Keeping already-processed games out of a
/// batch is the selector's job.
#[derive(Debug, Clone)]
pub struct BatchWriter {
    pool: SqlitePool,
    tables: StoreConfig,
}

impl BatchWriter {
    pub fn new(pool: SqlitePool, tables: StoreConfig) -> Self {
        Self { pool, tables }
    }

    pub async fn commit(&self, records: &BatchRecords) -> Result<WriteSummary> {
        self.commit_at(records, Utc::now()).await
    }

    /// Commit with an explicit processing timestamp.
    pub async fn commit_at(
        &self,
        records: &BatchRecords,
        processed_at: DateTime<Utc>,
    ) -> Result<WriteSummary> {
        if records.is_empty() {
            return Ok(WriteSummary::default());
        }
        let stamp = log_timestamp(processed_at);
        let moves = &self.tables.moves_table;
        let events = &self.tables.events_table;

        let mut tx = self.pool.begin().await?;
        create_moves_table(&mut tx, moves).await?;
        create_events_table(&mut tx, events).await?;

        let insert_move = format!(
            "INSERT INTO {moves} (game_id, move_number, move, score_white, log_timestamp)
             VALUES (?, ?, ?, ?, ?)"
        );
        for evaluation in &records.evaluations {
            sqlx::query(&insert_move)
                .bind(&evaluation.game_id)
                .bind(i64::from(evaluation.move_number))
                .bind(&evaluation.mv)
                .bind(i64::from(evaluation.score_white))
                .bind(&stamp)
                .execute(&mut *tx)
                .await?;
        }

        let insert_event = format!(
            "INSERT INTO {events} (game_id, username, move_number, phase, category, severity, log_timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        );
        for event in &records.events {
            sqlx::query(&insert_event)
                .bind(&event.game_id)
                .bind(&event.player)
                .bind(i64::from(event.move_number))
                .bind(event.phase.as_str())
                .bind(event.category.as_str())
                .bind(event.severity.as_str())
                .bind(&stamp)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let summary = WriteSummary {
            moves: records.evaluations.len(),
            events: records.events.len(),
        };
        info!(moves = summary.moves, events = summary.events, "Committed batch");
        Ok(summary)
    }

    /// Append clock readings to the times sink in one transaction.
    pub async fn commit_clocks(&self, rows: &[ClockRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let stamp = log_timestamp(Utc::now());
        let times = &self.tables.times_table;

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {times} (
                game_id TEXT NOT NULL,
                move_number INTEGER NOT NULL,
                time_remaining_seconds REAL NOT NULL,
                time_remaining TEXT NOT NULL,
                log_timestamp TEXT NOT NULL
            )"
        ))
        .execute(&mut *tx)
        .await?;

        let insert = format!(
            "INSERT INTO {times} (game_id, move_number, time_remaining_seconds, time_remaining, log_timestamp)
             VALUES (?, ?, ?, ?, ?)"
        );
        for row in rows {
            sqlx::query(&insert)
                .bind(&row.game_id)
                .bind(i64::from(row.reading.move_number))
                .bind(row.reading.seconds)
                .bind(&row.reading.text)
                .bind(&stamp)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(rows = rows.len(), "Committed clock readings");
        Ok(rows.len())
    }
}

fn log_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

async fn create_moves_table(conn: &mut SqliteConnection, table: &str) -> Result<()> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            game_id TEXT NOT NULL,
            move_number INTEGER NOT NULL,
            move TEXT NOT NULL,
            score_white INTEGER NOT NULL,
            log_timestamp TEXT NOT NULL
        )"
    ))
    .execute(&mut *conn)
    .await?;
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_game ON {table} (game_id)"
    ))
    .execute(conn)
    .await?;
    Ok(())
}

async fn create_events_table(conn: &mut SqliteConnection, table: &str) -> Result<()> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            game_id TEXT NOT NULL,
            username TEXT NOT NULL,
            move_number INTEGER NOT NULL,
            phase TEXT NOT NULL,
            category TEXT NOT NULL,
            severity TEXT NOT NULL,
            log_timestamp TEXT NOT NULL
        )"
    ))
    .execute(conn)
    .await?;
    Ok(())
}
