use super::*;
use crate::replay::MoveError;

const CHESS_COM_PGN: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "alice"]
[Black "bob"]
[Result "0-1"]

1. e4 {[%clk 0:02:59.9]} 1... e5 {[%clk 0:02:58.1]} 2. Nf3 {[%clk 0:02:57]} 2... Nc6 {[%clk 0:02:55.4]} 3. Bc4?! $6 3... Nf6 4. Ng5 d5 5. exd5 (5. Bxd5 Nxd5) 5... Nxd5 0-1
"#;

#[test]
fn test_headers_and_main_line() {
    let parsed = parse_pgn(CHESS_COM_PGN).unwrap();

    assert_eq!(parsed.header("White"), Some("alice"));
    assert_eq!(parsed.header("Result"), Some("0-1"));
    assert_eq!(
        parsed.sans(),
        vec!["e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6", "Ng5", "d5", "exd5", "Nxd5"]
    );
    assert_eq!(parsed.moves[9].played.uci, "f6d5");
    assert_eq!(parsed.moves[9].played.move_number, 10);
    assert!(parsed.stopped.is_none());
}

#[test]
fn test_comments_attach_to_previous_move() {
    let parsed = parse_pgn(CHESS_COM_PGN).unwrap();

    assert_eq!(parsed.moves[0].comment.as_deref(), Some("[%clk 0:02:59.9]"));
    assert_eq!(parsed.moves[3].comment.as_deref(), Some("[%clk 0:02:55.4]"));
    assert_eq!(parsed.moves[4].comment, None);
}

#[test]
fn test_game_comment_before_first_move_is_not_attached() {
    let parsed = parse_pgn("{Opening trap} 1. e4 {best} {by test} e5").unwrap();

    assert_eq!(parsed.moves[0].comment.as_deref(), Some("best by test"));
    assert_eq!(parsed.moves[1].comment, None);
}

#[test]
fn test_black_move_numbers_and_ellipsis() {
    let parsed = parse_pgn("1. e4 1... e5 2. Nf3 ... Nc6 *").unwrap();
    assert_eq!(parsed.sans(), vec!["e4", "e5", "Nf3", "Nc6"]);
}

#[test]
fn test_nested_variations_are_skipped() {
    let parsed = parse_pgn("1. e4 (1. d4 d5 (1... Nf6 {fine}) 2. c4) e5 2. Nf3").unwrap();
    assert_eq!(parsed.sans(), vec!["e4", "e5", "Nf3"]);
}

#[test]
fn test_line_comment_inside_variation() {
    let parsed =
        parse_pgn("1. e4 e5 (2. d4 ; comment with ) paren\n exd4) 2. Nf3 Nc6").unwrap();
    assert_eq!(parsed.sans(), vec!["e4", "e5", "Nf3", "Nc6"]);
}

#[test]
fn test_escape_line_is_ignored() {
    let parsed = parse_pgn("[Event \"x\"]\n% escape line\n1. e4 e5").unwrap();

    assert_eq!(parsed.header("Event"), Some("x"));
    assert_eq!(parsed.sans(), vec!["e4", "e5"]);
}

#[test]
fn test_castling_carries_king_move() {
    let parsed = parse_pgn("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O").unwrap();

    let last = &parsed.moves.last().unwrap().played;
    assert_eq!(last.san, "O-O");
    assert_eq!(last.uci, "e1g1");
}

#[test]
fn test_illegal_move_stops_the_main_line() {
    let parsed = parse_pgn("1. e4 e5 2. Ke3 {oops} Nc6 3. Nf3").unwrap();

    assert_eq!(parsed.sans(), vec!["e4", "e5"]);
    let stopped = parsed.stopped.unwrap();
    assert_eq!(stopped.move_number, 3);
    assert_eq!(stopped.san, "Ke3");
    assert_eq!(stopped.kind, MoveError::Illegal);
}

#[test]
fn test_headers_only_has_no_moves() {
    let parsed = parse_pgn("[Event \"Abandoned\"]\n\n*").unwrap();
    assert!(parsed.moves.is_empty());
    assert!(parsed.stopped.is_none());
}

#[test]
fn test_unterminated_comment_keeps_moves_before_it() {
    let parsed = parse_pgn("1. e4 {never closed").unwrap();
    assert_eq!(parsed.sans(), vec!["e4"]);
}

#[test]
fn test_empty_text_has_no_game() {
    assert!(matches!(parse_pgn(""), Err(PgnError::NoGame)));
}
