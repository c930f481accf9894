//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (rules core, adapter protocol, tests).
//!
//! # Board Dimensions
//!
//! Default board dimensions (boards are runtime-sized, these are the
//! observed standard values):
//!
//! - **Width**: 9 columns (indexed 0-8, left to right)
//! - **Height**: 9 rows (indexed 0-8, bottom to top)
//!
//! Gravity compacts columns toward row 0; refilled tiles enter from the top.
//!
//! # Tile Kinds
//!
//! A tile is either a *normal* color (`0..kind_count`, at most 8 colors) or
//! one of four special kinds spawned from larger matches:
//!
//! | Kind | Spawned by | Effect when triggered |
//! |------|------------|-----------------------|
//! | `LineHorizontal` | 4 in a horizontal line | clears its row |
//! | `LineVertical` | 4 in a vertical line | clears its column |
//! | `AreaBomb` | L/T/Cross shape | clears a 5x5 block |
//! | `ColorClear` | 5 in a line | clears every tile of one color |
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_CELL_SCORE` | 100 | Points per matched cell before multipliers |
//! | `BLAST_CELL_SCORE` | 10 | Points per cell removed by a special blast |
//! | `COMBO_BONUS_NUM/DEN` | 6/5 | Per-depth chain multiplier (1.2^depth) |
//!
//! # Examples
//!
//! ```
//! use cascade_types::{TileKind, Shape, GameState};
//!
//! let kind = TileKind::Normal(3);
//! assert!(kind.is_normal());
//! assert_eq!(TileKind::from_code(kind.code()), Some(kind));
//!
//! // Shape multipliers order rarer combos above plain lines
//! assert!(Shape::Cross.multiplier() > Shape::Line3.multiplier());
//!
//! // State adjacency is a static table
//! assert!(GameState::Idle.can_transition_to(GameState::AwaitingInput));
//! assert!(!GameState::Idle.can_transition_to(GameState::Shuffling));
//! ```

/// Default board width in columns (9)
pub const DEFAULT_BOARD_WIDTH: u8 = 9;

/// Default board height in rows (9)
pub const DEFAULT_BOARD_HEIGHT: u8 = 9;

/// Default number of normal tile colors in play
pub const DEFAULT_KIND_COUNT: u8 = 6;

/// Maximum number of normal tile colors supported
pub const MAX_KIND_COUNT: u8 = 8;

/// Points per matched cell before shape and chain multipliers
pub const BASE_CELL_SCORE: u64 = 100;

/// Points per cell removed by a special-tile blast
pub const BLAST_CELL_SCORE: u64 = 10;

/// Chain combo bonus numerator (6/5 = 1.2x per chain depth)
pub const COMBO_BONUS_NUM: u64 = 6;

/// Chain combo bonus denominator
pub const COMBO_BONUS_DEN: u64 = 5;

/// Hard cap on chain loop iterations per resolution sequence
pub const DEFAULT_MAX_CHAIN_DEPTH: u32 = 15;

/// Backstop depth tracked by the state machine (above the loop cap)
pub const STATE_CHAIN_DEPTH_BACKSTOP: u32 = 20;

/// Color-clear tiles that may fire as secondary triggers per blast wave
pub const DEFAULT_COLOR_TRIGGER_CAP: u32 = 1;

/// Line/area-bomb tiles that may fire as secondary triggers per blast wave
pub const DEFAULT_DIRECTIONAL_TRIGGER_CAP: u32 = 5;

/// Retained state transitions for diagnostics
pub const STATE_HISTORY_CAP: usize = 50;

/// A board coordinate: column `h` (left to right), row `v` (bottom to top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub h: i8,
    pub v: i8,
}

impl Pos {
    pub fn new(h: i8, v: i8) -> Self {
        Self { h, v }
    }

    /// True when `other` is exactly one cell away horizontally or vertically
    pub fn is_adjacent(&self, other: Pos) -> bool {
        let dh = (self.h - other.h).abs();
        let dv = (self.v - other.v).abs();
        dh + dv == 1
    }
}

/// One tile's kind: a normal color or a special elimination tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Normal color tile, id in `0..kind_count`
    Normal(u8),
    /// Clears its entire row when triggered
    LineHorizontal,
    /// Clears its entire column when triggered
    LineVertical,
    /// Clears a 5x5 block centered on itself when triggered
    AreaBomb,
    /// Clears every tile of one target color when triggered
    ColorClear,
}

impl TileKind {
    pub fn is_normal(&self) -> bool {
        matches!(self, TileKind::Normal(_))
    }

    pub fn is_special(&self) -> bool {
        !self.is_normal()
    }

    /// Wire code: normal colors map to their id, specials to 8-11
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_types::TileKind;
    ///
    /// assert_eq!(TileKind::Normal(2).code(), 2);
    /// assert_eq!(TileKind::LineHorizontal.code(), 8);
    /// assert_eq!(TileKind::ColorClear.code(), 11);
    /// ```
    pub fn code(&self) -> u8 {
        match self {
            TileKind::Normal(id) => *id,
            TileKind::LineHorizontal => 8,
            TileKind::LineVertical => 9,
            TileKind::AreaBomb => 10,
            TileKind::ColorClear => 11,
        }
    }

    /// Parse a wire code back into a kind; codes above 11 are invalid
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            id if id < MAX_KIND_COUNT => Some(TileKind::Normal(id)),
            8 => Some(TileKind::LineHorizontal),
            9 => Some(TileKind::LineVertical),
            10 => Some(TileKind::AreaBomb),
            11 => Some(TileKind::ColorClear),
            _ => None,
        }
    }
}

/// Orientation of a matched line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Recognized match shapes
///
/// Lines are tagged by length (5+ clamps to `Line5`). Compound shapes
/// require at least 3 cells sharing a row and 3 sharing a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Line3,
    Line4,
    Line5,
    LShape,
    TShape,
    Cross,
}

impl Shape {
    /// Score multiplier applied on top of `BASE_CELL_SCORE * cells`
    pub fn multiplier(&self) -> u64 {
        match self {
            Shape::Line3 => 1,
            Shape::Line4 => 2,
            Shape::Line5 => 4,
            Shape::LShape => 3,
            Shape::TShape => 3,
            Shape::Cross => 6,
        }
    }

    /// Resolution priority: higher resolves first (Cross > T > L > 5 > 4 > 3)
    pub fn priority(&self) -> u8 {
        match self {
            Shape::Cross => 5,
            Shape::TShape => 4,
            Shape::LShape => 3,
            Shape::Line5 => 2,
            Shape::Line4 => 1,
            Shape::Line3 => 0,
        }
    }

    /// Special tile spawned by this shape, if any
    ///
    /// Four-in-a-line spawns a line clearer oriented along the matched axis;
    /// five-in-a-line spawns a color clearer; compound shapes spawn an area
    /// bomb. Plain three-matches spawn nothing.
    pub fn spawned_special(&self, axis: Option<Axis>) -> Option<TileKind> {
        match self {
            Shape::Line3 => None,
            Shape::Line4 => match axis {
                Some(Axis::Vertical) => Some(TileKind::LineVertical),
                _ => Some(TileKind::LineHorizontal),
            },
            Shape::Line5 => Some(TileKind::ColorClear),
            Shape::LShape | Shape::TShape | Shape::Cross => Some(TileKind::AreaBomb),
        }
    }
}

/// Turn-level game states gating player input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Idle,
    AwaitingInput,
    Processing,
    Checking,
    Animating,
    Falling,
    Shuffling,
    GameOver,
    LevelWin,
    Paused,
}

impl GameState {
    /// Legal successor states; every edge not listed here is rejected
    pub fn legal_transitions(&self) -> &'static [GameState] {
        use GameState::*;
        match self {
            Idle => &[AwaitingInput, Processing],
            AwaitingInput => &[Processing, Paused, GameOver],
            Processing => &[Checking, Animating, Falling],
            Checking => &[Processing, AwaitingInput, LevelWin, GameOver],
            Animating => &[Checking, Falling],
            Falling => &[Checking, Shuffling],
            Shuffling => &[Checking],
            LevelWin => &[Idle],
            GameOver => &[Idle],
            Paused => &[AwaitingInput, Processing],
        }
    }

    pub fn can_transition_to(&self, to: GameState) -> bool {
        self.legal_transitions().contains(&to)
    }

    /// All states, for exhaustive table checks
    pub fn all() -> &'static [GameState] {
        use GameState::*;
        &[
            Idle,
            AwaitingInput,
            Processing,
            Checking,
            Animating,
            Falling,
            Shuffling,
            GameOver,
            LevelWin,
            Paused,
        ]
    }

    /// Snake-case name for logs and the adapter protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Idle => "idle",
            GameState::AwaitingInput => "awaiting_input",
            GameState::Processing => "processing",
            GameState::Checking => "checking",
            GameState::Animating => "animating",
            GameState::Falling => "falling",
            GameState::Shuffling => "shuffling",
            GameState::GameOver => "game_over",
            GameState::LevelWin => "level_win",
            GameState::Paused => "paused",
        }
    }
}

/// Sub-steps of one chain iteration, valid while Processing/Checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    MatchDetection,
    Elimination,
    GravityFall,
    Refill,
    ComboCheck,
    ResultCheck,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::MatchDetection => "match_detection",
            GamePhase::Elimination => "elimination",
            GamePhase::GravityFall => "gravity_fall",
            GamePhase::Refill => "refill",
            GamePhase::ComboCheck => "combo_check",
            GamePhase::ResultCheck => "result_check",
        }
    }
}

/// Engine error taxonomy
///
/// All variants are recoverable at the caller except `BoardCorruption`,
/// which indicates a broken internal invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Swap rejected: slots empty/moving/non-adjacent, or no match resulted
    InvalidSwap,
    /// Transition not present in the adjacency table; state unchanged
    IllegalStateTransition { from: GameState, to: GameState },
    /// Chain loop hit its depth cap; stats up to the break are still valid
    MaxChainDepthReached,
    /// A busy-flag collision; retry once the current operation finishes
    ConcurrentOperationRejected,
    /// Two tiles claimed one slot or similar; unreachable by design
    BoardCorruption,
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidSwap => "invalid_swap",
            EngineError::IllegalStateTransition { .. } => "illegal_state_transition",
            EngineError::MaxChainDepthReached => "max_chain_depth_reached",
            EngineError::ConcurrentOperationRejected => "concurrent_operation_rejected",
            EngineError::BoardCorruption => "board_corruption",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidSwap => write!(f, "swap rejected"),
            EngineError::IllegalStateTransition { from, to } => {
                write!(f, "illegal transition {} -> {}", from.as_str(), to.as_str())
            }
            EngineError::MaxChainDepthReached => write!(f, "max chain depth reached"),
            EngineError::ConcurrentOperationRejected => {
                write!(f, "operation already in flight")
            }
            EngineError::BoardCorruption => write!(f, "board invariant violated"),
        }
    }
}

impl std::error::Error for EngineError {}
