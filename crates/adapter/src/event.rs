//! Protocol events - serde mirrors of the listener callbacks
//!
//! Tile kinds travel as their wire code (normal colors 0-7, specials
//! 8-11); states and phases as their snake_case names. Every event
//! serializes to a single JSON object tagged by `type`.

use serde::{Deserialize, Serialize};

/// A board cell in wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub h: i8,
    pub v: i8,
}

/// One gravity relocation in wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: CellRecord,
    pub to: CellRecord,
    pub kind: u8,
}

/// Everything the engine reports outward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    ScoreUpdate {
        amount: u64,
    },
    TileRemoved {
        h: i8,
        v: i8,
        kind: u8,
    },
    SpecialSpawned {
        h: i8,
        v: i8,
        kind: u8,
    },
    StateChanged {
        from: String,
        to: String,
    },
    PhaseChanged {
        phase: String,
    },
    MoveDown {
        moves: Vec<MoveRecord>,
        refills: Vec<CellRecord>,
    },
    ResultCheck {
        total_matches: u64,
        total_score: u64,
        max_combo: u32,
        chain_depth: u32,
    },
    ChainFinished {
        total_matches: u64,
        total_score: u64,
        max_combo: u32,
        chain_depth: u32,
        shuffled: bool,
        stopped: bool,
    },
    /// A command could not be applied (bad swap, wrong state, ...)
    CommandRejected {
        code: String,
    },
}
