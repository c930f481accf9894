//! Listener contract - the only boundary toward the presentation layer
//!
//! The engine never renders; it reports what happened through this trait
//! and waits on [`Settle`] barriers where the presentation needs time
//! (tile-removal animations, gravity tweens). Headless users (tests, the
//! adapter's auto-settle mode) return [`Settle::ready`] and the engine runs
//! to completion synchronously.
//!
//! Win/lose evaluation stays outside the engine: [`GameListener::on_result_check`]
//! returns a [`ResultDirective`] instead of calling back into the core.

use std::sync::mpsc::Receiver;
use std::time::Duration;

use cascade_types::{GamePhase, GameState, Pos, TileKind};

use crate::board::TileMove;
use crate::state::ChainStats;

/// Upper bound on waiting for a single settle barrier
///
/// A disconnected or stalled presentation must not deadlock the engine;
/// past this the barrier resolves with a warning.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Synchronization barrier for one phase's animations
///
/// The presentation returns one of these from a settle point. The engine
/// does not proceed to the next phase until the expected number of
/// completion signals arrived. Phase-internal parallelism is fine: many
/// tiles animate at once, one barrier covers them jointly.
pub struct Settle {
    rx: Option<Receiver<()>>,
    expected: usize,
}

impl Settle {
    /// A barrier that is already complete (headless operation)
    pub fn ready() -> Self {
        Self {
            rx: None,
            expected: 0,
        }
    }

    /// A barrier completed by `expected` signals on the given channel
    pub fn from_receiver(rx: Receiver<()>, expected: usize) -> Self {
        Self {
            rx: Some(rx),
            expected,
        }
    }

    /// Block until every expected completion signal arrived
    ///
    /// A dropped sender or timeout resolves the barrier anyway; the engine
    /// must never hang on a dead presentation.
    pub fn wait(self) {
        let Some(rx) = self.rx else { return };
        for _ in 0..self.expected {
            match rx.recv_timeout(SETTLE_TIMEOUT) {
                Ok(()) => {}
                Err(err) => {
                    tracing::warn!(?err, "settle barrier resolved without completion signal");
                    return;
                }
            }
        }
    }
}

/// Verdict returned by the presentation's result check
///
/// Target-quota and step-budget tracking are owned externally; the engine
/// only reports eliminations and asks for the verdict here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultDirective {
    /// Game continues; return to awaiting input
    #[default]
    Continue,
    /// Level target reached
    Win,
    /// Out of moves/steps
    Lose,
    /// Abort the run; the engine lands in Idle with no further callbacks
    Stop,
}

/// Callbacks implemented by the presentation layer, wired at construction
///
/// All methods default to no-ops (and immediately-ready barriers), so a
/// listener implements only what it renders.
pub trait GameListener {
    /// Points awarded by an elimination wave (chain multiplier applied)
    fn on_score_update(&mut self, amount: u64) {
        let _ = amount;
    }

    /// A tile left the board; quota tracking hooks in here
    fn on_tile_removed(&mut self, pos: Pos, kind: TileKind) {
        let _ = (pos, kind);
    }

    /// A match promoted one cell to a special tile
    fn on_special_tile_spawned(&mut self, pos: Pos, kind: TileKind) {
        let _ = (pos, kind);
    }

    /// A validated state transition was applied
    fn on_state_changed(&mut self, from: GameState, to: GameState) {
        let _ = (from, to);
    }

    /// The chain loop entered a new phase
    fn on_phase_changed(&mut self, phase: GamePhase) {
        let _ = phase;
    }

    /// Gravity moves and refills for this wave; settle when tweens finish
    fn on_move_down(&mut self, moves: &[TileMove], refills: &[Pos]) -> Settle {
        let _ = (moves, refills);
        Settle::ready()
    }

    /// Elimination animations for this wave; settle when they finish
    fn on_animation_complete(&mut self) -> Settle {
        Settle::ready()
    }

    /// Chain converged; the caller decides win/lose/continue
    fn on_result_check(&mut self, stats: &ChainStats) -> ResultDirective {
        let _ = stats;
        ResultDirective::Continue
    }
}

/// Listener that ignores everything; useful in tests and benchmarks
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl GameListener for NullListener {}
