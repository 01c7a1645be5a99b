//! Incremental engine review of played games
//!
//! This crate provides:
//! - Selection of games not yet present in a processed sink
//! - Per-move engine scoring through a pool of UCI engine workers
//! - Classification of throws and missed opportunities by phase and severity
//! - All-or-nothing batch writes and run reports
//!
//! # Usage
//!
//! ```bash
//! # Evaluate one batch of unprocessed games
//! cargo run -p move_review -- --config review.toml run
//!
//! # Keep processing new games every five minutes
//! cargo run -p move_review -- --engine /usr/local/bin/stockfish watch
//! ```

mod classifier;
mod config;
mod error;
mod results;
mod runner;
mod store;
mod summary;
mod writer;

pub use classifier::*;
pub use config::*;
pub use error::*;
pub use results::*;
pub use runner::*;
pub use store::*;
pub use summary::*;
pub use writer::*;
