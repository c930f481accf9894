//! Cascade (workspace facade crate).
//!
//! This package keeps a single `cascade::{types,core,engine,adapter}` public
//! API while the implementation lives in dedicated crates under `crates/`.

pub use cascade_adapter as adapter;
pub use cascade_core as core;
pub use cascade_engine as engine;
pub use cascade_types as types;
