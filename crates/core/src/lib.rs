//! Rules core - pure, deterministic, and testable
//!
//! This crate contains the match-three rules: board storage, match
//! detection, elimination resolution, special-tile effects, the chain
//! reaction loop, and the game state machine. It has **zero dependencies**
//! on rendering, audio, or I/O, making it:
//!
//! - **Deterministic**: the same seed produces identical refills and
//!   shuffles (boards are reproducible in tests)
//! - **Testable**: every rule is reachable without a presentation layer
//! - **Portable**: runs headless; animation waits collapse to no-ops
//!
//! # Module Structure
//!
//! - [`board`]: runtime-sized grid with gravity and refill
//! - [`matcher`]: pure match detection (lines and compound shapes)
//! - [`resolver`]: converts match groups into removals, scores, and
//!   special-tile spawns
//! - [`special`]: affected-cell computation for triggered special tiles
//! - [`chain`]: the bounded detect/resolve/settle loop
//! - [`state`]: the state machine gating player input
//! - [`listener`]: the typed callback contract toward the presentation
//! - [`rng`]: deterministic LCG used for refills, shuffles, and color picks
//! - [`shuffle`]: board permutation when no legal move remains
//!
//! # Control Flow
//!
//! After any board mutation (player swap, special trigger, shuffle) the
//! [`chain::ChainController`] drives detection, elimination, gravity and
//! refill to convergence, bounded by a hard depth cap. Phase ordering is
//! strict; within a phase the presentation may animate many tiles at once
//! and the engine waits on a single [`listener::Settle`] barrier.

pub mod board;
pub mod chain;
pub mod listener;
pub mod matcher;
pub mod resolver;
pub mod rng;
pub mod shuffle;
pub mod special;
pub mod state;

pub use cascade_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Tile, TileMove};
pub use chain::{ChainConfig, ChainController, ChainReport, Opening, SpecialTrigger, StopHandle};
pub use listener::{GameListener, NullListener, ResultDirective, Settle};
pub use matcher::{find_legal_swap, find_matches, has_legal_move, would_swap_match, MatchGroup, MatchResult};
pub use resolver::{EliminationResolver, ScoreScale, WaveOutcome};
pub use rng::SimpleRng;
pub use state::{ChainStats, GameStateMachine};
