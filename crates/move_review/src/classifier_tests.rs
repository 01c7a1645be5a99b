use super::*;
use chess_core::Color;

const THRESHOLDS: ScoreThresholds = ScoreThresholds {
    variance_score_blunder: 100,
    variance_score_massive_blunder: 300,
    even_score_limit: 100,
};

const PHASES: PhaseCutoffs = PhaseCutoffs {
    early_end_move: 20,
    mid_end_move: 60,
};

/// Evaluations where `player_scores` are the mover's own scores on their
/// plies and the opponent's plies carry `filler`.
fn game_for(color: Color, player_scores: &[i32], filler: i32) -> Vec<MoveEvaluation> {
    let mut evaluations = Vec::new();
    let mut move_number = 1;
    for &score in player_scores {
        for side in [Color::White, Color::Black] {
            let own = side == color;
            let score_white = if own { score * color.sign() } else { filler };
            evaluations.push(MoveEvaluation {
                game_id: "g".to_string(),
                move_number,
                mv: "0000".to_string(),
                score_white,
            });
            move_number += 1;
        }
    }
    evaluations
}

fn player(color: Color) -> Participant {
    Participant {
        username: "alice".to_string(),
        color,
    }
}

#[test]
fn test_known_sequence_yields_one_throw() {
    let classifier = MoveClassifier::new(THRESHOLDS, PHASES);
    let evaluations = game_for(Color::White, &[50, 40, -200, -180], 0);

    let events = classifier.classify_game(&evaluations, &player(Color::White));

    assert_eq!(
        events,
        vec![ClassifiedEvent {
            game_id: "g".to_string(),
            player: "alice".to_string(),
            move_number: 5,
            phase: Phase::Early,
            category: Category::Throw,
            severity: Severity::Small,
        }]
    );

    let stricter = ScoreThresholds {
        variance_score_massive_blunder: 200,
        ..THRESHOLDS
    };
    let events = MoveClassifier::new(stricter, PHASES).classify_game(&evaluations, &player(Color::White));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Massive);
}

#[test]
fn test_black_scores_are_negated() {
    let classifier = MoveClassifier::new(THRESHOLDS, PHASES);
    // Black's own view: +300 then -100, a drop of 400 while ahead.
    let evaluations = game_for(Color::Black, &[300, -100], 0);
    assert_eq!(evaluations[1].score_white, -300);

    let events = classifier.classify_game(&evaluations, &player(Color::Black));

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].move_number, 4);
    assert_eq!(events[0].category, Category::MissedOpportunity);
    assert_eq!(events[0].severity, Severity::Massive);

    // White gained in the same game, so nothing for White.
    assert!(classifier
        .classify_game(&evaluations, &player(Color::White))
        .is_empty());
}

#[test]
fn test_even_score_limit_boundary_routes_to_throw() {
    assert_eq!(
        classify_transition(100, -50, &THRESHOLDS),
        Some((Category::Throw, Severity::Small))
    );
    assert_eq!(
        classify_transition(101, -49, &THRESHOLDS),
        Some((Category::MissedOpportunity, Severity::Small))
    );
}

#[test]
fn test_severity_boundaries_are_inclusive() {
    assert_eq!(classify_transition(0, -99, &THRESHOLDS), None);
    assert_eq!(
        classify_transition(0, -100, &THRESHOLDS),
        Some((Category::Throw, Severity::Small))
    );
    assert_eq!(
        classify_transition(0, -299, &THRESHOLDS),
        Some((Category::Throw, Severity::Small))
    );
    assert_eq!(
        classify_transition(0, -300, &THRESHOLDS),
        Some((Category::Throw, Severity::Massive))
    );
}

#[test]
fn test_improvements_are_never_events() {
    assert_eq!(classify_transition(-500, 500, &THRESHOLDS), None);
    assert_eq!(classify_transition(1000, 1000, &THRESHOLDS), None);
}

#[test]
fn test_phase_cutoff_belongs_to_lower_phase() {
    assert_eq!(PHASES.phase_of(1), Phase::Early);
    assert_eq!(PHASES.phase_of(20), Phase::Early);
    assert_eq!(PHASES.phase_of(21), Phase::Mid);
    assert_eq!(PHASES.phase_of(60), Phase::Mid);
    assert_eq!(PHASES.phase_of(61), Phase::Late);
    assert_eq!(PHASES.phase_of(500), Phase::Late);
}

#[test]
fn test_event_phase_uses_later_move() {
    let classifier = MoveClassifier::new(THRESHOLDS, PHASES);
    // Ten White moves: plies 1, 3, ..., 19 early; the drop lands on ply 21.
    let mut scores = vec![0; 10];
    scores.push(-150);
    let evaluations = game_for(Color::White, &scores, 0);

    let events = classifier.classify_game(&evaluations, &player(Color::White));

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].move_number, 21);
    assert_eq!(events[0].phase, Phase::Mid);
}

#[test]
fn test_fewer_than_two_evaluations_yield_nothing() {
    let classifier = MoveClassifier::new(THRESHOLDS, PHASES);
    let one_move = vec![MoveEvaluation {
        game_id: "g".to_string(),
        move_number: 1,
        mv: "e2e4".to_string(),
        score_white: 900,
    }];

    assert!(classifier.classify_game(&[], &player(Color::White)).is_empty());
    assert!(classifier
        .classify_game(&one_move, &player(Color::White))
        .is_empty());
    assert!(classifier
        .classify_game(&one_move, &player(Color::Black))
        .is_empty());
}

#[test]
fn test_massive_is_monotonic_in_the_massive_cutoff() {
    for before in (-400..=400).step_by(50) {
        for drop in (0..=1200).step_by(25) {
            for massive in (150..=900).step_by(75) {
                let base = ScoreThresholds {
                    variance_score_blunder: 100,
                    variance_score_massive_blunder: massive,
                    even_score_limit: 100,
                };
                let Some((_, Severity::Massive)) = classify_transition(before, before - drop, &base)
                else {
                    continue;
                };
                // Any smaller massive cutoff that keeps the ordering still says massive.
                for smaller in (101..massive).step_by(37) {
                    let looser = ScoreThresholds {
                        variance_score_massive_blunder: smaller,
                        ..base
                    };
                    assert_eq!(
                        classify_transition(before, before - drop, &looser).map(|(_, s)| s),
                        Some(Severity::Massive),
                        "before={before} drop={drop} massive={massive} smaller={smaller}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_category_is_decided_by_score_before_only() {
    for before in -300..=300 {
        let Some((category, _)) = classify_transition(before, before - 500, &THRESHOLDS) else {
            panic!("a 500 drop is always an event");
        };
        let expected = if before <= THRESHOLDS.even_score_limit {
            Category::Throw
        } else {
            Category::MissedOpportunity
        };
        assert_eq!(category, expected);
    }
}
