//! Engine facade - wires the rules core into a playable game
//!
//! [`Game`] owns the board, state machine, chain controller, and RNG as an
//! explicitly wired component graph (no globals), takes the presentation's
//! listener at construction, and exposes the player-facing operations:
//!
//! - [`Game::try_swap`]: validate and drive a swap to completion
//! - [`Game::trigger_special`]: tap a special tile directly
//! - [`Game::force_stop`], [`Game::pause`], [`Game::resume`]
//! - [`Game::hint`] / [`Game::has_legal_move`]: stuck-board queries
//!
//! A rejected swap leaves the board bit-identical to before the attempt;
//! the caller only observes the `InvalidSwap` error and snaps its tiles
//! back.

pub mod game;
pub mod swap;

pub use cascade_core as core;
pub use cascade_types as types;

pub use game::{Game, GameConfig};
pub use swap::evaluate_swap;
