//! Tests for the UCI child-process session
//!
//! A small shell script stands in for a real engine, so these run anywhere
//! `/bin/sh` exists.

#![cfg(unix)]

use std::path::Path;
use std::time::{Duration, Instant};

use uci_engine::{
    EngineCommand, EngineError, EngineEvaluator, EngineScore, GameOutcome, SearchLimits,
    StopSignal, UciEngine, UciLauncher,
};

const FAKE_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name FakeFish 1.0"; echo "uciok" ;;
    isready) echo "readyok" ;;
    "position startpos moves e2e4") score="cp -25" ;;
    position*) score="cp 10" ;;
    go*) echo "info depth 1 score cp 999 lowerbound"; echo "info depth 2 score $score pv e7e5"; echo "bestmove e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

const HANGING_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) sleep 30 ;;
    quit) exit 0 ;;
  esac
done
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> EngineCommand {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    EngineCommand::new("/bin/sh").arg(path.to_string_lossy())
}

fn fast_limits() -> SearchLimits {
    SearchLimits {
        move_time: Duration::from_millis(10),
        grace: Duration::from_millis(300),
        handshake: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_handshake_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let command = write_script(dir.path(), "fake.sh", FAKE_ENGINE).option("Hash", 16);

    let mut engine = UciEngine::spawn(&command, fast_limits()).await.unwrap();
    assert_eq!(engine.name(), "FakeFish 1.0");

    let score = engine.search(&["e2e4"]).await.unwrap();
    assert_eq!(score, EngineScore::Centipawns(-25));

    engine.quit().await.unwrap();
}

#[tokio::test]
async fn test_hung_search_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let command = write_script(dir.path(), "hang.sh", HANGING_ENGINE);
    let limits = fast_limits();

    let mut engine = UciEngine::spawn(&command, limits.clone()).await.unwrap();
    let started = Instant::now();
    let err = engine.search(&["e2e4"]).await.unwrap_err();

    assert!(matches!(err, EngineError::Timeout { stage: "go", .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
    engine.kill().await;
}

#[tokio::test]
async fn test_missing_executable_is_a_spawn_error() {
    let command = EngineCommand::new("/definitely/not/an/engine");
    let err = UciEngine::spawn(&command, fast_limits()).await.err().unwrap();
    assert!(matches!(err, EngineError::Spawn { .. }));
}

#[tokio::test]
async fn test_evaluator_with_process_engine() {
    let dir = tempfile::tempdir().unwrap();
    let command = write_script(dir.path(), "fake.sh", FAKE_ENGINE);
    let evaluator = EngineEvaluator::new(UciLauncher::new(command, fast_limits()), StopSignal::new());

    let outcome = evaluator.evaluate("proc", "1. e4 e5").await;

    let scores: Vec<i32> = outcome.evaluations().iter().map(|e| e.score_white).collect();
    // Black to move after e4 reports -25, i.e. +25 for White.
    assert_eq!(scores, vec![25, 10]);
    assert!(matches!(outcome, GameOutcome::Complete(_)));
}

#[tokio::test]
async fn test_evaluator_recovers_from_hung_engine() {
    let dir = tempfile::tempdir().unwrap();
    let command = write_script(dir.path(), "hang.sh", HANGING_ENGINE);
    let evaluator = EngineEvaluator::new(UciLauncher::new(command, fast_limits()), StopSignal::new());

    let outcome = evaluator.evaluate("hung", "1. e4 e5").await;

    assert!(matches!(
        outcome,
        GameOutcome::EngineFailed {
            error: EngineError::Timeout { .. },
            moves_scored: 0
        }
    ));
}
