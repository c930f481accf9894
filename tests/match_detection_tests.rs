//! Match detection properties over full board snapshots

use cascade::core::{find_matches, would_swap_match, Board};
use cascade::types::{Axis, Pos, Shape, TileKind};

const N0: TileKind = TileKind::Normal(0);
const N1: TileKind = TileKind::Normal(1);

/// 9x9 filler with kinds 2-5 in a period-2 checkerboard: no matches, and
/// no two filler cells can be swapped into one.
fn quiet_board() -> Board {
    let mut rows = Vec::new();
    for v in 0..9 {
        let mut row = Vec::new();
        for h in 0..9 {
            row.push(TileKind::Normal(2 + (h % 2) as u8 + 2 * (v % 2) as u8));
        }
        rows.push(row);
    }
    Board::from_rows(&rows, 6).unwrap()
}

#[test]
fn test_empty_state_idempotence() {
    let board = quiet_board();
    let first = find_matches(&board);
    let second = find_matches(&board);
    assert!(!first.has_matches());
    assert_eq!(first, second);
    assert!(first.groups.is_empty());
}

#[test]
fn test_row_scenario_three_a_tiles() {
    // Row 4 starts [A, A, A, B, C, ...]: exactly one Line3 of the A tiles
    let mut board = quiet_board();
    board.set_kind(Pos::new(0, 4), N0);
    board.set_kind(Pos::new(1, 4), N0);
    board.set_kind(Pos::new(2, 4), N0);

    let result = find_matches(&board);
    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.shape, Shape::Line3);
    assert_eq!(group.kind, N0);
    assert_eq!(
        group.cells,
        vec![Pos::new(0, 4), Pos::new(1, 4), Pos::new(2, 4)]
    );
}

#[test]
fn test_detection_soundness_on_random_boards() {
    use cascade::core::SimpleRng;

    // All groups: 3+ cells, one kind, disjoint across the whole result
    for seed in 1..40u32 {
        let mut rng = SimpleRng::new(seed);
        let board = Board::generate(9, 9, 4, &mut rng);
        let result = find_matches(&board);

        let mut seen = std::collections::HashSet::new();
        for group in &result.groups {
            assert!(group.len() >= 3, "seed {}: undersized group", seed);
            for cell in &group.cells {
                assert_eq!(
                    board.kind_at(*cell),
                    Some(group.kind),
                    "seed {}: kind mismatch",
                    seed
                );
                assert!(
                    seen.insert(*cell),
                    "seed {}: cell {:?} in two groups",
                    seed,
                    cell
                );
            }
        }
    }
}

#[test]
fn test_priority_line_claims_shared_cell() {
    // A 3-line crossing a 5-cell plus at its center: the line wins the
    // shared cell, and the leftover cross remnant cannot reach 5 cells.
    let mut board = quiet_board();
    for (h, v) in [(3, 4), (4, 4), (5, 4), (4, 5), (4, 3)] {
        board.set_kind(Pos::new(h, v), N0);
    }

    let result = find_matches(&board);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].shape, Shape::Line3);
    assert!(result.groups.iter().all(|g| g.shape != Shape::Cross));
}

#[test]
fn test_detector_never_mutates_board() {
    let mut board = quiet_board();
    for h in 0..4 {
        board.set_kind(Pos::new(h, 0), N1);
    }
    let before = board.clone();
    let result = find_matches(&board);
    assert!(result.has_matches());
    assert_eq!(board, before);
}

#[test]
fn test_scores_follow_shape_weights() {
    let mut board = quiet_board();
    for h in 0..3 {
        board.set_kind(Pos::new(h, 0), N0);
    }
    let line3_score = find_matches(&board).total_score;

    let mut board = quiet_board();
    for h in 0..4 {
        board.set_kind(Pos::new(h, 0), N0);
    }
    let line4_score = find_matches(&board).total_score;

    let mut board = quiet_board();
    for h in 0..5 {
        board.set_kind(Pos::new(h, 0), N0);
    }
    let line5_score = find_matches(&board).total_score;

    assert_eq!(line3_score, 300);
    assert_eq!(line4_score, 800);
    assert_eq!(line5_score, 2000);
    assert!(line3_score < line4_score && line4_score < line5_score);
}

#[test]
fn test_axis_tags_match_orientation() {
    let mut board = quiet_board();
    for h in 2..5 {
        board.set_kind(Pos::new(h, 7), N0);
    }
    for v in 0..3 {
        board.set_kind(Pos::new(8, v), N1);
    }
    let result = find_matches(&board);
    assert_eq!(result.groups.len(), 2);
    for group in &result.groups {
        match group.kind {
            k if k == N0 => assert_eq!(group.axis, Some(Axis::Horizontal)),
            k if k == N1 => assert_eq!(group.axis, Some(Axis::Vertical)),
            other => panic!("unexpected group kind {:?}", other),
        }
    }
}

#[test]
fn test_swap_simulation_does_not_mutate() {
    let mut board = quiet_board();
    board.set_kind(Pos::new(0, 4), N0);
    board.set_kind(Pos::new(1, 4), N0);
    board.set_kind(Pos::new(2, 5), N0);
    let before = board.clone();

    assert!(would_swap_match(&board, Pos::new(2, 4), Pos::new(2, 5)));
    assert_eq!(board, before);
}
