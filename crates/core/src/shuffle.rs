//! Board shuffle - kind permutation when no legal move remains
//!
//! Special tiles keep their slots; only normal tile kinds are permuted in
//! place (Fisher-Yates). A shuffle is retried until the board both has a
//! legal move and holds no ready-made match, so the player always resumes
//! on a playable, quiet board.

use crate::board::Board;
use crate::matcher::{find_matches, has_legal_move};
use crate::rng::SimpleRng;

/// Safety bound on reshuffle attempts
///
/// A board that cannot be made playable (for instance a single kind
/// everywhere) would otherwise loop forever; past the cap the last
/// permutation stands and a warning is logged. Match-free permutations are
/// rare on a dense board, so the cap is generous.
const MAX_SHUFFLE_ATTEMPTS: u32 = 256;

/// Permute the kinds of all non-special tiles in place
pub fn shuffle_kinds(board: &mut Board, rng: &mut SimpleRng) {
    let mut positions = Vec::new();
    let mut kinds = Vec::new();
    for (pos, tile) in board.tiles() {
        if tile.kind().is_normal() && !tile.is_moving() {
            positions.push(pos);
            kinds.push(tile.kind());
        }
    }
    rng.shuffle(&mut kinds);
    for (pos, kind) in positions.iter().zip(kinds) {
        board.set_kind(*pos, kind);
    }
}

/// Shuffle until the board is playable and match-free
///
/// Returns the number of shuffles performed (zero when the board was
/// already playable).
pub fn ensure_playable(board: &mut Board, rng: &mut SimpleRng) -> u32 {
    let mut attempts = 0;
    while attempts < MAX_SHUFFLE_ATTEMPTS {
        if has_legal_move(board) && !find_matches(board).has_matches() {
            return attempts;
        }
        shuffle_kinds(board, rng);
        attempts += 1;
    }
    tracing::warn!(
        attempts,
        "shuffle attempt cap reached without a playable quiet board"
    );
    attempts
}
