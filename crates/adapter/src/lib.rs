//! Adapter module - async bridge between the engine and a presentation
//!
//! The rules engine is synchronous and listener-driven; most front ends
//! are not. This crate runs a [`game::Game`](cascade_engine::Game) on a
//! dedicated thread and exposes:
//!
//! - a command channel ([`EngineCommand`]): swaps, special taps, pause,
//!   force-stop, restart, shutdown
//! - an event stream ([`EngineEvent`]): serde-serializable mirrors of every
//!   listener callback, suitable for a line-delimited JSON protocol
//! - an [`AnimationGate`]: the presentation's handle for completing the
//!   engine's settle barriers when its tweens finish
//! - a [`VerdictSlot`]: where quota/step tracking deposits the win/lose
//!   verdict the engine asks for after each chain
//!
//! With `auto_settle` enabled (the default) the barriers resolve
//! immediately and the engine runs headless, which is what tests and bot
//! drivers want.

pub mod event;
pub mod runtime;

pub use cascade_core as core;
pub use cascade_engine as engine;
pub use cascade_types as types;

pub use event::{CellRecord, EngineEvent, MoveRecord};
pub use runtime::{AnimationGate, EngineCommand, EngineRuntime, RuntimeConfig, VerdictSlot};
