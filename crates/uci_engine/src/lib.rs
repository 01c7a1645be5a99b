//! UCI engine client for move review.
//!
//! This crate provides:
//! - A child-process UCI session with per-search deadlines
//! - Score parsing and mate normalization
//! - The per-game evaluator that replays a game and scores every move
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use uci_engine::{EngineCommand, EngineEvaluator, SearchLimits, StopSignal, UciLauncher};
//!
//! # async fn demo() {
//! let launcher = UciLauncher::new(
//!     EngineCommand::new("/usr/games/stockfish"),
//!     SearchLimits::move_time(Duration::from_millis(100)),
//! );
//! let evaluator = EngineEvaluator::new(launcher, StopSignal::new());
//! let outcome = evaluator.evaluate("game-1", "1. e4 e5 2. Nf3").await;
//! println!("{} moves scored", outcome.evaluations().len());
//! # }
//! ```

mod error;
mod evaluator;
mod limits;
mod protocol;
mod score;
mod session;

pub use error::*;
pub use evaluator::*;
pub use limits::*;
pub use protocol::*;
pub use score::*;
pub use session::*;
