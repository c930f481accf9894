//! Special-tile effect calculation - pure, board-snapshot based
//!
//! Computes the *additional* cells a triggered special tile affects. The
//! triggered tile's own cell is always included separately by the caller,
//! so none of these functions return it.
//!
//! When a player swap directly exchanges two special tiles, the interaction
//! matrix in [`classify_special_swap`] / [`combined_swap_blast`] takes
//! precedence over the generic incidental-trigger handling in the chain
//! controller.

use cascade_types::{Pos, TileKind};

use crate::board::Board;
use crate::rng::SimpleRng;

/// Additional cells affected by triggering a special tile at `pos`
///
/// - `LineHorizontal`: every occupied cell in the tile's row
/// - `LineVertical`: every occupied cell in the tile's column
/// - `AreaBomb`: occupied cells in a 5x5 block clamped to the board
/// - `ColorClear`: handled by [`color_clear_cells`] since it needs a target
pub fn effect_cells(board: &Board, pos: Pos, kind: TileKind) -> Vec<Pos> {
    let mut out = Vec::new();
    match kind {
        TileKind::LineHorizontal => {
            for h in 0..board.width() as i8 {
                let p = Pos::new(h, pos.v);
                if p != pos && board.get(p.h, p.v).is_some() {
                    out.push(p);
                }
            }
        }
        TileKind::LineVertical => {
            for v in 0..board.height() as i8 {
                let p = Pos::new(pos.h, v);
                if p != pos && board.get(p.h, p.v).is_some() {
                    out.push(p);
                }
            }
        }
        TileKind::AreaBomb => {
            for h in pos.h - 2..=pos.h + 2 {
                for v in pos.v - 2..=pos.v + 2 {
                    let p = Pos::new(h, v);
                    if p != pos && board.get(h, v).is_some() {
                        out.push(p);
                    }
                }
            }
        }
        TileKind::ColorClear | TileKind::Normal(_) => {}
    }
    out
}

/// Every occupied cell holding the target normal color
pub fn color_clear_cells(board: &Board, target: u8) -> Vec<Pos> {
    board.positions_of_kind(TileKind::Normal(target))
}

/// Pick a uniformly random normal kind among those present on the board
///
/// Kinds with zero remaining tiles are excluded, so a color clear always
/// hits something while any normal tile exists.
pub fn random_present_kind(board: &Board, rng: &mut SimpleRng) -> Option<u8> {
    let present = board.present_normal_kinds();
    rng.pick(&present).copied()
}

/// Interaction class for a direct swap of two special tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapCombo {
    /// ColorClear x ColorClear: the whole board goes
    DoubleColorClear,
    /// ColorClear x line/bomb: board-wide conversion, then union of ranges
    ColorWithDirectional { directional: TileKind },
    /// line/bomb x line/bomb: both ranges union and trigger together
    DirectionalPair,
}

/// Classify a two-special swap; None unless both kinds are special
pub fn classify_special_swap(a: TileKind, b: TileKind) -> Option<SwapCombo> {
    if !a.is_special() || !b.is_special() {
        return None;
    }
    match (a, b) {
        (TileKind::ColorClear, TileKind::ColorClear) => Some(SwapCombo::DoubleColorClear),
        (TileKind::ColorClear, other) => Some(SwapCombo::ColorWithDirectional {
            directional: other,
        }),
        (other, TileKind::ColorClear) => Some(SwapCombo::ColorWithDirectional {
            directional: other,
        }),
        _ => Some(SwapCombo::DirectionalPair),
    }
}

/// Result of a two-special swap: cells to clear plus in-place conversions
#[derive(Debug, Clone, Default)]
pub struct SpecialBlast {
    /// Cells to remove, deduplicated; includes both swapped tiles
    pub cleared: Vec<Pos>,
    /// Tiles converted to a special kind before removal (cascading
    /// conversion of the ColorClear x directional combo)
    pub converted: Vec<(Pos, TileKind)>,
}

/// Compute the combined blast of a direct two-special swap
///
/// `a` and `b` are the post-swap positions of the two special tiles. Does
/// not mutate the board; the caller applies `converted` before removal so
/// observers see the conversion.
pub fn combined_swap_blast(
    board: &Board,
    a: Pos,
    b: Pos,
    combo: SwapCombo,
    rng: &mut SimpleRng,
) -> SpecialBlast {
    let mut blast = SpecialBlast::default();
    match combo {
        SwapCombo::DoubleColorClear => {
            blast.cleared = board.occupied_positions();
        }
        SwapCombo::DirectionalPair => {
            let ka = board.kind_at(a);
            let kb = board.kind_at(b);
            blast.cleared.push(a);
            blast.cleared.push(b);
            if let Some(kind) = ka {
                blast.cleared.extend(effect_cells(board, a, kind));
            }
            if let Some(kind) = kb {
                blast.cleared.extend(effect_cells(board, b, kind));
            }
        }
        SwapCombo::ColorWithDirectional { directional } => {
            blast.cleared.push(a);
            blast.cleared.push(b);
            if let Some(target) = random_present_kind(board, rng) {
                for pos in color_clear_cells(board, target) {
                    blast.converted.push((pos, directional));
                    blast.cleared.push(pos);
                    blast.cleared.extend(effect_cells(board, pos, directional));
                }
            }
        }
    }
    blast.cleared.sort_unstable();
    blast.cleared.dedup();
    blast
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_types::TileKind;

    fn full_board() -> Board {
        let mut rng = SimpleRng::new(3);
        Board::generate(9, 9, 6, &mut rng)
    }

    #[test]
    fn test_line_horizontal_affects_whole_row() {
        let board = full_board();
        let pos = Pos::new(4, 6);
        let cells = effect_cells(&board, pos, TileKind::LineHorizontal);
        assert_eq!(cells.len(), 8);
        assert!(cells.iter().all(|p| p.v == 6 && p.h != 4));
    }

    #[test]
    fn test_line_vertical_affects_whole_column() {
        let board = full_board();
        let pos = Pos::new(2, 0);
        let cells = effect_cells(&board, pos, TileKind::LineVertical);
        assert_eq!(cells.len(), 8);
        assert!(cells.iter().all(|p| p.h == 2 && p.v != 0));
    }

    #[test]
    fn test_area_bomb_center_affects_24_cells() {
        let board = full_board();
        let cells = effect_cells(&board, Pos::new(4, 4), TileKind::AreaBomb);
        // 5x5 block minus the bomb's own cell
        assert_eq!(cells.len(), 24);
        assert!(cells
            .iter()
            .all(|p| (p.h - 4).abs() <= 2 && (p.v - 4).abs() <= 2));
    }

    #[test]
    fn test_area_bomb_clamps_at_corner() {
        let board = full_board();
        let cells = effect_cells(&board, Pos::new(0, 0), TileKind::AreaBomb);
        // Only the in-bounds 3x3 quadrant survives, minus the bomb itself
        assert_eq!(cells.len(), 8);
        assert!(cells.iter().all(|p| p.h <= 2 && p.v <= 2));
    }

    #[test]
    fn test_area_bomb_skips_empty_slots() {
        let mut board = full_board();
        board.remove(Pos::new(3, 3));
        board.remove(Pos::new(5, 5));
        let cells = effect_cells(&board, Pos::new(4, 4), TileKind::AreaBomb);
        assert_eq!(cells.len(), 22);
    }

    #[test]
    fn test_color_clear_cells_hit_only_target_kind() {
        let board = full_board();
        let cells = color_clear_cells(&board, 2);
        assert!(!cells.is_empty());
        for pos in &cells {
            assert_eq!(board.kind_at(*pos), Some(TileKind::Normal(2)));
        }
    }

    #[test]
    fn test_random_present_kind_excludes_absent() {
        let rows = vec![vec![
            TileKind::Normal(5),
            TileKind::Normal(5),
        ]];
        let board = Board::from_rows(&rows, 6).unwrap();
        let mut rng = SimpleRng::new(9);
        for _ in 0..20 {
            assert_eq!(random_present_kind(&board, &mut rng), Some(5));
        }
    }

    #[test]
    fn test_random_present_kind_on_empty_board() {
        let board = Board::new(4, 4, 6);
        let mut rng = SimpleRng::new(9);
        assert_eq!(random_present_kind(&board, &mut rng), None);
    }

    #[test]
    fn test_classify_special_swap_matrix() {
        use SwapCombo::*;
        assert_eq!(
            classify_special_swap(TileKind::ColorClear, TileKind::ColorClear),
            Some(DoubleColorClear)
        );
        assert_eq!(
            classify_special_swap(TileKind::ColorClear, TileKind::AreaBomb),
            Some(ColorWithDirectional {
                directional: TileKind::AreaBomb
            })
        );
        assert_eq!(
            classify_special_swap(TileKind::LineVertical, TileKind::ColorClear),
            Some(ColorWithDirectional {
                directional: TileKind::LineVertical
            })
        );
        assert_eq!(
            classify_special_swap(TileKind::LineHorizontal, TileKind::LineVertical),
            Some(DirectionalPair)
        );
        assert_eq!(
            classify_special_swap(TileKind::Normal(0), TileKind::ColorClear),
            None
        );
        assert_eq!(
            classify_special_swap(TileKind::Normal(0), TileKind::Normal(1)),
            None
        );
    }

    #[test]
    fn test_double_color_clear_takes_whole_board() {
        let mut board = full_board();
        board.set_kind(Pos::new(4, 4), TileKind::ColorClear);
        board.set_kind(Pos::new(5, 4), TileKind::ColorClear);
        let mut rng = SimpleRng::new(1);
        let blast = combined_swap_blast(
            &board,
            Pos::new(4, 4),
            Pos::new(5, 4),
            SwapCombo::DoubleColorClear,
            &mut rng,
        );
        assert_eq!(blast.cleared.len(), 81);
        assert!(blast.converted.is_empty());
    }

    #[test]
    fn test_directional_pair_unions_ranges() {
        let mut board = full_board();
        let a = Pos::new(4, 4);
        let b = Pos::new(5, 4);
        board.set_kind(a, TileKind::LineHorizontal);
        board.set_kind(b, TileKind::LineVertical);
        let mut rng = SimpleRng::new(1);
        let blast =
            combined_swap_blast(&board, a, b, SwapCombo::DirectionalPair, &mut rng);

        // Row 4 (9 cells) plus column 5 (9 cells) minus the shared (5, 4)
        assert_eq!(blast.cleared.len(), 17);
        assert!(blast.cleared.contains(&a));
        assert!(blast.cleared.contains(&b));
        for pos in &blast.cleared {
            assert!(pos.v == 4 || pos.h == 5);
        }
    }

    #[test]
    fn test_color_with_directional_converts_and_unions() {
        let mut board = full_board();
        let a = Pos::new(4, 4);
        let b = Pos::new(4, 5);
        board.set_kind(a, TileKind::ColorClear);
        board.set_kind(b, TileKind::LineHorizontal);
        let mut rng = SimpleRng::new(1);
        let blast = combined_swap_blast(
            &board,
            a,
            b,
            SwapCombo::ColorWithDirectional {
                directional: TileKind::LineHorizontal,
            },
            &mut rng,
        );

        assert!(!blast.converted.is_empty());
        for (pos, kind) in &blast.converted {
            assert_eq!(*kind, TileKind::LineHorizontal);
            assert!(board.kind_at(*pos).map(|k| k.is_normal()).unwrap_or(false));
            // Every converted tile's whole row is in the cleared union
            for h in 0..9 {
                assert!(blast.cleared.contains(&Pos::new(h, pos.v)));
            }
        }
        assert!(blast.cleared.contains(&a));
        assert!(blast.cleared.contains(&b));
        // No duplicates survive the dedup
        let mut sorted = blast.cleared.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), blast.cleared.len());
    }
}
