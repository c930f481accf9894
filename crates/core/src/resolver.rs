//! Elimination resolution - match groups become board mutations
//!
//! Groups resolve in shape-priority order (Cross > T > L > Line5 > Line4 >
//! Line3) so rarer combos score and spawn their special tile before plain
//! lines. Each group scores `cells * 100 * shape multiplier`, scaled by the
//! chain multiplier the controller passes in.
//!
//! A group of 4 in a line promotes one of its cells to a line-clear tile
//! (oriented along the matched axis), 5 in a line to a color clearer, and
//! compound shapes to an area bomb. The promoted cell is *not* removed: the
//! spawned tile takes its slot. The spawn cell is the group cell the player
//! swapped when one exists, otherwise the group's center.

use cascade_types::{EngineError, Pos, TileKind, COMBO_BONUS_DEN, COMBO_BONUS_NUM};

use crate::board::Board;
use crate::listener::GameListener;
use crate::matcher::{MatchGroup, MatchResult};

/// Integer chain-score multiplier: `(num/den)^depth`, default 1.2^depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreScale {
    num: u64,
    den: u64,
}

impl ScoreScale {
    /// Identity scale (depth 0)
    pub fn unit() -> Self {
        Self { num: 1, den: 1 }
    }

    /// Scale for the given chain depth
    ///
    /// Depth is capped well below any power that could overflow u64.
    pub fn at_depth(depth: u32) -> Self {
        let d = depth.min(24);
        Self {
            num: COMBO_BONUS_NUM.pow(d),
            den: COMBO_BONUS_DEN.pow(d),
        }
    }

    pub fn apply(&self, raw: u64) -> u64 {
        raw.saturating_mul(self.num) / self.den
    }
}

/// What one resolution wave did to the board
#[derive(Debug, Clone, Default)]
pub struct WaveOutcome {
    /// Tiles removed from the board
    pub removed: usize,
    /// Scaled score reported for this wave
    pub score: u64,
    /// Special tiles spawned in place of removed cells
    pub spawned: Vec<(Pos, TileKind)>,
}

/// Converts detected groups into removals, scores, and spawns
///
/// Holds only the busy flag: one resolution in flight per resolver, ever.
#[derive(Debug, Default)]
pub struct EliminationResolver {
    busy: bool,
}

impl EliminationResolver {
    pub fn new() -> Self {
        Self { busy: false }
    }

    /// Resolve all groups of one detection pass
    ///
    /// `origin` carries the player's swap cells while resolving the wave
    /// the swap caused; cascades pass None. Resolving an empty result is a
    /// no-op, not an error. A second call while one is in flight is
    /// rejected with `ConcurrentOperationRejected`.
    pub fn resolve<L: GameListener>(
        &mut self,
        board: &mut Board,
        result: &MatchResult,
        origin: Option<(Pos, Pos)>,
        scale: ScoreScale,
        listener: &mut L,
    ) -> Result<WaveOutcome, EngineError> {
        if self.busy {
            return Err(EngineError::ConcurrentOperationRejected);
        }
        if !result.has_matches() {
            return Ok(WaveOutcome::default());
        }
        self.busy = true;

        let mut order: Vec<&MatchGroup> = result.groups.iter().collect();
        order.sort_by(|a, b| b.shape.priority().cmp(&a.shape.priority()));

        let mut outcome = WaveOutcome::default();
        for group in order {
            let scaled = scale.apply(group.score());
            listener.on_score_update(scaled);
            outcome.score = outcome.score.saturating_add(scaled);

            let spawn_kind = group.shape.spawned_special(group.axis);
            let spawn_pos = spawn_kind.map(|_| spawn_cell(group, origin));

            for cell in &group.cells {
                if spawn_pos == Some(*cell) {
                    continue;
                }
                if let Some(tile) = board.remove(*cell) {
                    listener.on_tile_removed(*cell, tile.kind());
                    outcome.removed += 1;
                }
            }

            if let (Some(kind), Some(pos)) = (spawn_kind, spawn_pos) {
                if board.set_kind(pos, kind) {
                    listener.on_special_tile_spawned(pos, kind);
                    outcome.spawned.push((pos, kind));
                }
            }
        }

        self.busy = false;
        Ok(outcome)
    }
}

/// Pick the cell a spawned special tile replaces
///
/// Prefer the group cell the player actually swapped; cascades fall back
/// to the group's center cell.
fn spawn_cell(group: &MatchGroup, origin: Option<(Pos, Pos)>) -> Pos {
    if let Some((a, b)) = origin {
        for cell in &group.cells {
            if *cell == a || *cell == b {
                return *cell;
            }
        }
    }
    group.cells[group.cells.len() / 2]
}
