//! Swap evaluation - what work does an exchange actually cause?
//!
//! Runs after the board exchange has been applied. Produces the chain
//! [`Opening`] for the swap, or None when the exchange has no effect and
//! must be snapped back:
//!
//! - two special tiles: the interaction matrix computes the combined blast
//!   (conversions are applied to the board here so observers see them)
//! - at least one resulting match: the swap cells become the spawn origin
//! - a special tile moved by the swap: it fires in place; a color clearer
//!   swapped with a normal tile targets that tile's color

use cascade_core::board::Board;
use cascade_core::chain::{Opening, SpecialTrigger};
use cascade_core::matcher::find_matches;
use cascade_core::rng::SimpleRng;
use cascade_core::special::{classify_special_swap, combined_swap_blast};
use cascade_types::{Pos, TileKind};

/// Evaluate an already-applied exchange of `a` and `b`
///
/// Returns the opening seeding the chain run, or None for a dead swap
/// (caller swaps back and reports `InvalidSwap`).
pub fn evaluate_swap(
    board: &mut Board,
    rng: &mut SimpleRng,
    a: Pos,
    b: Pos,
) -> Option<Opening> {
    let ka = board.kind_at(a)?;
    let kb = board.kind_at(b)?;

    // Direct two-special exchange: the matrix takes precedence over the
    // generic per-tile trigger handling.
    if let Some(combo) = classify_special_swap(ka, kb) {
        let blast = combined_swap_blast(board, a, b, combo, rng);
        for (pos, kind) in &blast.converted {
            board.set_kind(*pos, *kind);
        }
        return Some(Opening {
            origin: None,
            triggers: Vec::new(),
            clear: blast.cleared,
        });
    }

    let mut opening = Opening::default();
    let mut accepted = false;

    if find_matches(board).has_matches() {
        opening.origin = Some((a, b));
        accepted = true;
    }

    for (pos, kind, other) in [(a, ka, kb), (b, kb, ka)] {
        if kind.is_special() {
            let forced_target = match (kind, other) {
                (TileKind::ColorClear, TileKind::Normal(id)) => Some(id),
                _ => None,
            };
            opening.triggers.push(SpecialTrigger {
                pos,
                kind,
                forced_target,
            });
            accepted = true;
        }
    }

    accepted.then_some(opening)
}
