//! Match detection - pure scan over a board snapshot
//!
//! `find_matches` never mutates the board and never touches presentation.
//! Detection runs in three passes:
//!
//! 1. **Linear scan** - every row left to right and every column bottom to
//!    top, accumulating runs of equal normal kinds. Empty, moving, special,
//!    and already-claimed cells terminate a run. Runs of 3+ become groups
//!    tagged by length (5+ clamps to `Line5`).
//! 2. **Compound scan** - cells not claimed by pass 1 are tested against
//!    four L templates, four T templates, and a plus-shaped cross template.
//!    A pattern qualifies only with 5+ cells, at least 3 sharing a row, and
//!    at least 3 sharing a column.
//! 3. **Claiming** - every cell assigned to a group is marked claimed, so
//!    groups from one detection call are always disjoint. Because pass 2
//!    only sees unclaimed cells, lines win over compound shapes at shared
//!    cells.

use cascade_types::{Axis, Pos, Shape, TileKind, BASE_CELL_SCORE};

use crate::board::Board;

/// A set of same-kind cells satisfying a shape rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub cells: Vec<Pos>,
    pub kind: TileKind,
    pub shape: Shape,
    /// Orientation for line shapes; None for compound shapes
    pub axis: Option<Axis>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Score for eliminating this group, before chain multipliers
    pub fn score(&self) -> u64 {
        self.cells.len() as u64 * BASE_CELL_SCORE * self.shape.multiplier()
    }
}

/// Detection output: disjoint groups plus a score preview
///
/// A pure derived value; resolution ordering is the resolver's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub groups: Vec<MatchGroup>,
    pub total_score: u64,
}

impl MatchResult {
    pub fn has_matches(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Claimed-cell tracker for one detection call
struct Claims {
    width: usize,
    flags: Vec<bool>,
}

impl Claims {
    fn new(board: &Board) -> Self {
        Self {
            width: board.width() as usize,
            flags: vec![false; board.width() as usize * board.height() as usize],
        }
    }

    fn is_claimed(&self, pos: Pos) -> bool {
        self.flags[pos.v as usize * self.width + pos.h as usize]
    }

    fn claim_all(&mut self, cells: &[Pos]) {
        for pos in cells {
            self.flags[pos.v as usize * self.width + pos.h as usize] = true;
        }
    }
}

/// Kind usable for matching: present, settled, and a normal color
fn matchable_kind(board: &Board, h: i8, v: i8) -> Option<TileKind> {
    let tile = board.get(h, v)?;
    if tile.is_moving() || !tile.kind().is_normal() {
        return None;
    }
    Some(tile.kind())
}

/// Scan a board snapshot for all matchable groups
pub fn find_matches(board: &Board) -> MatchResult {
    let mut claims = Claims::new(board);
    let mut groups = Vec::new();

    scan_lines(board, &mut claims, &mut groups);
    scan_compound_shapes(board, &mut claims, &mut groups);

    let total_score = groups.iter().map(|g| g.score()).sum();
    MatchResult {
        groups,
        total_score,
    }
}

fn line_shape(len: usize) -> Shape {
    match len {
        3 => Shape::Line3,
        4 => Shape::Line4,
        _ => Shape::Line5,
    }
}

fn scan_lines(board: &Board, claims: &mut Claims, groups: &mut Vec<MatchGroup>) {
    // Rows, left to right
    for v in 0..board.height() as i8 {
        let mut run: Vec<Pos> = Vec::new();
        let mut run_kind: Option<TileKind> = None;
        for h in 0..board.width() as i8 {
            let pos = Pos::new(h, v);
            let kind = matchable_kind(board, h, v).filter(|_| !claims.is_claimed(pos));
            step_run(kind, pos, &mut run, &mut run_kind, Axis::Horizontal, claims, groups);
        }
        flush_run(&mut run, run_kind, Axis::Horizontal, claims, groups);
    }

    // Columns, bottom to top
    for h in 0..board.width() as i8 {
        let mut run: Vec<Pos> = Vec::new();
        let mut run_kind: Option<TileKind> = None;
        for v in 0..board.height() as i8 {
            let pos = Pos::new(h, v);
            let kind = matchable_kind(board, h, v).filter(|_| !claims.is_claimed(pos));
            step_run(kind, pos, &mut run, &mut run_kind, Axis::Vertical, claims, groups);
        }
        flush_run(&mut run, run_kind, Axis::Vertical, claims, groups);
    }
}

fn step_run(
    kind: Option<TileKind>,
    pos: Pos,
    run: &mut Vec<Pos>,
    run_kind: &mut Option<TileKind>,
    axis: Axis,
    claims: &mut Claims,
    groups: &mut Vec<MatchGroup>,
) {
    match kind {
        Some(k) if Some(k) == *run_kind => run.push(pos),
        Some(k) => {
            flush_run(run, *run_kind, axis, claims, groups);
            run.push(pos);
            *run_kind = Some(k);
        }
        None => {
            flush_run(run, *run_kind, axis, claims, groups);
            *run_kind = None;
        }
    }
}

fn flush_run(
    run: &mut Vec<Pos>,
    run_kind: Option<TileKind>,
    axis: Axis,
    claims: &mut Claims,
    groups: &mut Vec<MatchGroup>,
) {
    if run.len() >= 3 {
        if let Some(kind) = run_kind {
            let cells = std::mem::take(run);
            claims.claim_all(&cells);
            groups.push(MatchGroup {
                shape: line_shape(cells.len()),
                kind,
                axis: Some(axis),
                cells,
            });
            return;
        }
    }
    run.clear();
}

/// L templates: a 3-cell horizontal arm plus a 2-cell vertical arm off the
/// shared corner, in all four orientations.
const L_TEMPLATES: [([i8; 3], [i8; 2]); 4] = [
    ([0, 1, 2], [-1, -2]),
    ([0, -1, -2], [-1, -2]),
    ([0, 1, 2], [1, 2]),
    ([0, -1, -2], [1, 2]),
];

/// T templates as (base, stem) offset pairs in (dh, dv) form.
const T_TEMPLATES: [([(i8, i8); 3], [(i8, i8); 2]); 4] = [
    ([(-1, 0), (0, 0), (1, 0)], [(0, -1), (0, -2)]),
    ([(-1, 0), (0, 0), (1, 0)], [(0, 1), (0, 2)]),
    ([(0, -1), (0, 0), (0, 1)], [(-1, 0), (-2, 0)]),
    ([(0, -1), (0, 0), (0, 1)], [(1, 0), (2, 0)]),
];

fn scan_compound_shapes(board: &Board, claims: &mut Claims, groups: &mut Vec<MatchGroup>) {
    for v in 0..board.height() as i8 {
        for h in 0..board.width() as i8 {
            let pos = Pos::new(h, v);
            if claims.is_claimed(pos) {
                continue;
            }
            let Some(kind) = matchable_kind(board, h, v) else {
                continue;
            };

            if let Some(cells) = match_l_template(board, claims, pos, kind) {
                claims.claim_all(&cells);
                groups.push(MatchGroup {
                    cells,
                    kind,
                    shape: Shape::LShape,
                    axis: None,
                });
                continue;
            }
            if let Some(cells) = match_t_template(board, claims, pos, kind) {
                claims.claim_all(&cells);
                groups.push(MatchGroup {
                    cells,
                    kind,
                    shape: Shape::TShape,
                    axis: None,
                });
                continue;
            }
            if let Some(cells) = match_cross_template(board, claims, pos, kind) {
                claims.claim_all(&cells);
                groups.push(MatchGroup {
                    cells,
                    kind,
                    shape: Shape::Cross,
                    axis: None,
                });
            }
        }
    }
}

fn cell_matches(board: &Board, claims: &Claims, pos: Pos, kind: TileKind) -> bool {
    matchable_kind(board, pos.h, pos.v) == Some(kind) && !claims.is_claimed(pos)
}

fn match_l_template(
    board: &Board,
    claims: &Claims,
    origin: Pos,
    kind: TileKind,
) -> Option<Vec<Pos>> {
    for (h_arm, v_arm) in L_TEMPLATES {
        let mut cells = Vec::with_capacity(5);
        let mut ok = true;
        for dh in h_arm {
            let pos = Pos::new(origin.h + dh, origin.v);
            if !cell_matches(board, claims, pos, kind) {
                ok = false;
                break;
            }
            cells.push(pos);
        }
        if ok {
            for dv in v_arm {
                let pos = Pos::new(origin.h, origin.v + dv);
                if !cell_matches(board, claims, pos, kind) {
                    ok = false;
                    break;
                }
                cells.push(pos);
            }
        }
        if ok && qualifies_as_compound(&cells) {
            return Some(cells);
        }
    }
    None
}

fn match_t_template(
    board: &Board,
    claims: &Claims,
    origin: Pos,
    kind: TileKind,
) -> Option<Vec<Pos>> {
    for (base, stem) in T_TEMPLATES {
        let mut cells = Vec::with_capacity(5);
        let mut ok = true;
        for (dh, dv) in base.iter().chain(stem.iter()) {
            let pos = Pos::new(origin.h + dh, origin.v + dv);
            if !cell_matches(board, claims, pos, kind) {
                ok = false;
                break;
            }
            cells.push(pos);
        }
        if ok && qualifies_as_compound(&cells) {
            return Some(cells);
        }
    }
    None
}

fn match_cross_template(
    board: &Board,
    claims: &Claims,
    origin: Pos,
    kind: TileKind,
) -> Option<Vec<Pos>> {
    let mut cells = vec![origin];
    for (dh, dv) in [(1i8, 0i8), (-1, 0), (0, 1), (0, -1)] {
        for step in 1..=2i8 {
            let pos = Pos::new(origin.h + dh * step, origin.v + dv * step);
            if cell_matches(board, claims, pos, kind) {
                cells.push(pos);
            } else {
                break;
            }
        }
    }
    if qualifies_as_compound(&cells) {
        Some(cells)
    } else {
        None
    }
}

/// Compound legitimacy: 5+ cells, at least 3 sharing one row and 3 sharing
/// one column. Pure lines pass trivially via the linear scan instead.
fn qualifies_as_compound(cells: &[Pos]) -> bool {
    if cells.len() < 5 {
        return false;
    }
    let mut max_in_row = 0;
    let mut max_in_col = 0;
    for anchor in cells {
        let in_row = cells.iter().filter(|c| c.v == anchor.v).count();
        let in_col = cells.iter().filter(|c| c.h == anchor.h).count();
        max_in_row = max_in_row.max(in_row);
        max_in_col = max_in_col.max(in_col);
    }
    max_in_row >= 3 && max_in_col >= 3
}

/// Would exchanging two slots produce at least one match?
///
/// Simulates on a clone; an illegal exchange (empty or moving slot) is
/// never a match.
pub fn would_swap_match(board: &Board, a: Pos, b: Pos) -> bool {
    let mut scratch = board.clone();
    if scratch.swap(a, b).is_err() {
        return false;
    }
    find_matches(&scratch).has_matches()
}

/// Find one legal player move: adjacent normal tiles whose exchange matches
///
/// Special tiles are skipped; triggering one is always legal and therefore
/// never leaves the board stuck.
pub fn find_legal_swap(board: &Board) -> Option<(Pos, Pos)> {
    for v in 0..board.height() as i8 {
        for h in 0..board.width() as i8 {
            let a = Pos::new(h, v);
            let Some(ka) = board.kind_at(a) else { continue };
            if ka.is_special() {
                continue;
            }
            for b in [Pos::new(h + 1, v), Pos::new(h, v + 1)] {
                let Some(kb) = board.kind_at(b) else { continue };
                if kb.is_special() {
                    continue;
                }
                if would_swap_match(board, a, b) {
                    return Some((a, b));
                }
            }
        }
    }
    None
}

/// True when at least one legal move exists (including any special tile)
pub fn has_legal_move(board: &Board) -> bool {
    if board.tiles().any(|(_, t)| t.kind().is_special()) {
        return true;
    }
    find_legal_swap(board).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    const N0: TileKind = TileKind::Normal(0);
    const N1: TileKind = TileKind::Normal(1);

    /// Filler board: kinds 2-5 in a period-2 checkerboard, so no run of 3
    /// exists anywhere and no swap of two filler cells can create one.
    /// Target cells in tests use kinds 0 and 1, which never collide with
    /// the filler.
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

    fn set_cells(board: &mut Board, kind: TileKind, cells: &[(i8, i8)]) {
        for &(h, v) in cells {
            assert!(board.set_kind(Pos::new(h, v), kind));
        }
    }

    #[test]
    fn test_empty_board_has_no_matches() {
        let board = Board::new(9, 9, 6);
        let result = find_matches(&board);
        assert!(!result.has_matches());
        assert!(result.groups.is_empty());
        assert_eq!(result.total_score, 0);
    }

    #[test]
    fn test_quiet_board_has_no_matches() {
        assert!(!find_matches(&quiet_board()).has_matches());
    }

    #[test]
    fn test_horizontal_line3_detected() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(0, 4), (1, 4), (2, 4)]);

        let result = find_matches(&board);
        assert_eq!(result.groups.len(), 1);
        let group = &result.groups[0];
        assert_eq!(group.shape, Shape::Line3);
        assert_eq!(group.kind, N0);
        assert_eq!(group.axis, Some(Axis::Horizontal));
        assert_eq!(
            group.cells,
            vec![Pos::new(0, 4), Pos::new(1, 4), Pos::new(2, 4)]
        );
    }

    #[test]
    fn test_vertical_line4_detected() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(7, 2), (7, 3), (7, 4), (7, 5)]);

        let result = find_matches(&board);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].shape, Shape::Line4);
        assert_eq!(result.groups[0].axis, Some(Axis::Vertical));
        assert_eq!(result.groups[0].len(), 4);
    }

    #[test]
    fn test_long_run_clamps_to_line5() {
        let mut board = quiet_board();
        set_cells(
            &mut board,
            N0,
            &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0)],
        );
        let result = find_matches(&board);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].shape, Shape::Line5);
        assert_eq!(result.groups[0].len(), 7);
    }

    #[test]
    fn test_moving_tile_terminates_run() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(0, 4), (1, 4), (2, 4)]);
        board.set_moving(Pos::new(1, 4), true);
        assert!(!find_matches(&board).has_matches());
    }

    #[test]
    fn test_special_tile_terminates_run() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(0, 4), (1, 4), (2, 4)]);
        board.set_kind(Pos::new(1, 4), TileKind::AreaBomb);
        assert!(!find_matches(&board).has_matches());
    }

    #[test]
    fn test_groups_are_disjoint_and_same_kind() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(0, 4), (1, 4), (2, 4)]);
        set_cells(&mut board, N1, &[(6, 1), (6, 2), (6, 3)]);

        let result = find_matches(&board);
        assert_eq!(result.groups.len(), 2);
        let mut seen = std::collections::HashSet::new();
        for group in &result.groups {
            assert!(group.len() >= 3);
            for cell in &group.cells {
                assert!(seen.insert(*cell), "cell {:?} claimed twice", cell);
                assert_eq!(board.kind_at(*cell), Some(group.kind));
            }
        }
    }

    #[test]
    fn test_line_takes_priority_over_cross() {
        let mut board = quiet_board();
        // A 5-cell plus shape: the horizontal 3-line claims the center
        // first, the leftover column remnant cannot reach 5 cells, so only
        // the line is reported.
        set_cells(&mut board, N0, &[(3, 4), (4, 4), (5, 4), (4, 5), (4, 3)]);

        let result = find_matches(&board);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].shape, Shape::Line3);
        assert_eq!(result.groups[0].axis, Some(Axis::Horizontal));
    }

    #[test]
    fn test_short_runs_silently_dropped() {
        let mut board = quiet_board();
        // Pairs in both axes, never reaching 3
        set_cells(&mut board, N0, &[(5, 5), (6, 5), (5, 2), (5, 3)]);
        assert!(!find_matches(&board).has_matches());
    }

    #[test]
    fn test_l_template_matches_bent_arm() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(2, 4), (3, 4), (4, 4), (2, 3), (2, 2)]);

        let claims = Claims::new(&board);
        let cells = match_l_template(&board, &claims, Pos::new(2, 4), N0)
            .expect("L template should match at the corner");
        assert_eq!(cells.len(), 5);
        assert!(qualifies_as_compound(&cells));
    }

    #[test]
    fn test_t_template_matches_base_and_stem() {
        let mut board = quiet_board();
        set_cells(&mut board, N1, &[(2, 6), (3, 6), (4, 6), (3, 5), (3, 4)]);

        let claims = Claims::new(&board);
        let cells = match_t_template(&board, &claims, Pos::new(3, 6), N1)
            .expect("T template should match at the base center");
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn test_cross_template_needs_five_cells() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(4, 4), (3, 4), (5, 4), (4, 3), (4, 5)]);

        let claims = Claims::new(&board);
        let cells = match_cross_template(&board, &claims, Pos::new(4, 4), N0)
            .expect("plus shape should match the cross template");
        assert_eq!(cells.len(), 5);

        // Removing one arm leaves 4 cells: no cross
        board.set_kind(Pos::new(4, 5), TileKind::Normal(2));
        assert!(match_cross_template(&board, &claims, Pos::new(4, 4), N0).is_none());
    }

    #[test]
    fn test_compound_rule_needs_dual_axis() {
        // 5-cell staircase: no 3 share a row or column
        let zigzag = [
            Pos::new(0, 0),
            Pos::new(1, 0),
            Pos::new(1, 1),
            Pos::new(2, 1),
            Pos::new(2, 2),
        ];
        assert!(!qualifies_as_compound(&zigzag));

        let l_shape = [
            Pos::new(2, 4),
            Pos::new(3, 4),
            Pos::new(4, 4),
            Pos::new(2, 3),
            Pos::new(2, 2),
        ];
        assert!(qualifies_as_compound(&l_shape));

        // Pure line of 5 trivially shares one axis but not the other
        let line5: Vec<Pos> = (0..5).map(|h| Pos::new(h, 3)).collect();
        assert!(!qualifies_as_compound(&line5));
    }

    #[test]
    fn test_total_score_uses_shape_multiplier() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(0, 4), (1, 4), (2, 4)]);
        // 3 cells * 100 * 1
        assert_eq!(find_matches(&board).total_score, 300);
    }

    #[test]
    fn test_would_swap_match() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(0, 4), (1, 4), (2, 5)]);
        assert!(would_swap_match(&board, Pos::new(2, 4), Pos::new(2, 5)));
        assert!(!would_swap_match(&board, Pos::new(6, 6), Pos::new(7, 6)));
    }

    #[test]
    fn test_would_swap_match_rejects_empty_slot() {
        let mut board = quiet_board();
        board.remove(Pos::new(0, 0));
        assert!(!would_swap_match(&board, Pos::new(0, 0), Pos::new(1, 0)));
    }

    #[test]
    fn test_no_legal_swap_on_quiet_board() {
        assert_eq!(find_legal_swap(&quiet_board()), None);
        assert!(!has_legal_move(&quiet_board()));
    }

    #[test]
    fn test_find_legal_swap_detects_setup() {
        let mut board = quiet_board();
        set_cells(&mut board, N0, &[(0, 4), (1, 4), (2, 5)]);
        assert!(find_legal_swap(&board).is_some());
        assert!(has_legal_move(&board));
    }

    #[test]
    fn test_special_tile_counts_as_legal_move() {
        let mut board = quiet_board();
        board.set_kind(Pos::new(4, 4), TileKind::ColorClear);
        assert!(has_legal_move(&board));
        // The hint scan itself skips specials
        assert_eq!(find_legal_swap(&board), None);
    }
}
