//! Tests for replaying recorded games
//!
//! This module covers:
//! - Complete games, including castling and en passant
//! - Truncation at the first illegal or unreadable move
//! - Games that cannot be replayed at all

use chess_core::{replay_pgn, replay_san, MoveError};

// =============================================================================
// Complete Games
// =============================================================================

#[test]
fn test_scholars_mate_replays_fully() {
    let replay = replay_pgn("1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7# 1-0").unwrap();

    assert!(replay.is_complete());
    assert_eq!(
        replay.uci_moves(),
        vec!["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]
    );
    let plies: Vec<u32> = replay.moves.iter().map(|m| m.move_number).collect();
    assert_eq!(plies, (1..=7).collect::<Vec<_>>());
}

#[test]
fn test_castling_and_en_passant() {
    let replay = replay_san(&[
        "e4", "Nf6", "e5", "d5", "exd6", "e6", "Nf3", "Be7", "Bc4", "O-O", "O-O",
    ]);

    assert!(replay.is_complete());
    let uci = replay.uci_moves();
    assert_eq!(uci[4], "e5d6");
    assert_eq!(uci[9], "e8g8");
    assert_eq!(uci[10], "e1g1");
}

// =============================================================================
// Truncation
// =============================================================================

#[test]
fn test_illegal_move_truncates_at_last_legal_position() {
    let replay = replay_san(&["e4", "e5", "Ke3", "Nc6"]);

    assert_eq!(replay.moves.len(), 2);
    let stopped = replay.stopped.expect("replay should stop");
    assert_eq!(stopped.move_number, 3);
    assert_eq!(stopped.san, "Ke3");
    assert_eq!(stopped.kind, MoveError::Illegal);
}

#[test]
fn test_garbage_first_move_yields_nothing() {
    let replay = replay_pgn("1. xyzzy e5 *").unwrap();

    assert!(replay.moves.is_empty());
    assert_eq!(replay.stopped.map(|e| e.move_number), Some(1));
}

#[test]
fn test_malformed_san_stops_replay() {
    let replay = replay_san(&["e4", "e5", "Zz9"]);

    assert_eq!(replay.uci_moves(), vec!["e2e4", "e7e5"]);
    let stopped = replay.stopped.expect("replay should stop");
    assert_eq!(stopped.move_number, 3);
    assert_eq!(stopped.kind, MoveError::Malformed);
}

#[test]
fn test_ambiguous_move_stops_replay() {
    // Both knights can reach d2.
    let replay = replay_san(&["d4", "a6", "Nf3", "a5", "Nd2"]);

    assert_eq!(replay.moves.len(), 4);
    assert_eq!(replay.stopped.map(|e| e.kind), Some(MoveError::Ambiguous));
}

#[test]
fn test_annotated_moves_replay() {
    let replay = replay_san(&["e4!", "e5?!", "Qh5", "Nc6", "Bc4", "Nf6??", "Qxf7#"]);

    assert!(replay.is_complete());
    assert_eq!(replay.moves[6].san, "Qxf7#");
    assert_eq!(replay.moves[6].uci, "h5f7");
}

// =============================================================================
// Unreadable Input
// =============================================================================

#[test]
fn test_text_without_a_game_is_an_error() {
    assert!(replay_pgn("").is_err());
}

#[test]
fn test_move_text_without_moves_replays_nothing() {
    let replay = replay_pgn("1. Zz9 Qq0 *").unwrap();

    assert!(replay.moves.is_empty());
    assert!(replay.is_complete());
}
