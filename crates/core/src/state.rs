//! Game state machine - legal transitions and chain bookkeeping
//!
//! Every transition is validated against the static adjacency table in
//! `cascade_types::GameState::legal_transitions`. Illegal transitions are
//! rejected and logged; the current state never changes on rejection.
//!
//! Entry actions:
//! - `AwaitingInput` resets the combo counter and chain depth
//! - `Processing` marks a chain as active
//! - `LevelWin` / `GameOver` clear the chain-active flag
//!
//! A bounded ring of recent transitions is retained for diagnostics only.

use arrayvec::ArrayVec;
use cascade_types::{
    EngineError, GamePhase, GameState, STATE_CHAIN_DEPTH_BACKSTOP, STATE_HISTORY_CAP,
};

/// Accumulated statistics for one resolution sequence
///
/// Reset when a new player-initiated sequence starts, accumulated across
/// chain iterations within it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainStats {
    pub total_matches: u64,
    pub total_score: u64,
    pub current_combo: u32,
    pub max_combo: u32,
    pub chain_depth: u32,
}

/// The turn-level state machine gating player input
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    current: GameState,
    previous: GameState,
    phase: GamePhase,
    stats: ChainStats,
    chain_active: bool,
    depth_backstop: u32,
    history: ArrayVec<(GameState, GameState), STATE_HISTORY_CAP>,
}

impl GameStateMachine {
    pub fn new() -> Self {
        Self {
            current: GameState::Idle,
            previous: GameState::Idle,
            phase: GamePhase::MatchDetection,
            stats: ChainStats::default(),
            chain_active: false,
            depth_backstop: STATE_CHAIN_DEPTH_BACKSTOP,
            history: ArrayVec::new(),
        }
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    pub fn previous(&self) -> GameState {
        self.previous
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn stats(&self) -> &ChainStats {
        &self.stats
    }

    /// Recent transitions, oldest first; diagnostics only
    pub fn history(&self) -> &[(GameState, GameState)] {
        &self.history
    }

    /// Player input is accepted only while idle or awaiting input
    pub fn can_accept_input(&self) -> bool {
        matches!(self.current, GameState::Idle | GameState::AwaitingInput)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.current, GameState::GameOver | GameState::LevelWin)
    }

    pub fn is_chain_active(&self) -> bool {
        self.chain_active
    }

    /// Apply a transition if the adjacency table allows it
    ///
    /// A transition to the current state is a no-op. Illegal transitions
    /// are logged and rejected; the state stays unchanged.
    pub fn transition(&mut self, to: GameState) -> Result<(), EngineError> {
        if to == self.current {
            return Ok(());
        }
        if !self.current.can_transition_to(to) {
            tracing::warn!(
                from = self.current.as_str(),
                to = to.as_str(),
                "rejected illegal state transition"
            );
            return Err(EngineError::IllegalStateTransition {
                from: self.current,
                to,
            });
        }

        let from = self.current;
        self.previous = from;
        self.current = to;
        self.record_history(from, to);
        self.enter(to);
        Ok(())
    }

    fn record_history(&mut self, from: GameState, to: GameState) {
        if self.history.is_full() {
            self.history.remove(0);
        }
        self.history.push((from, to));
    }

    fn enter(&mut self, state: GameState) {
        match state {
            GameState::AwaitingInput => {
                self.stats = ChainStats::default();
                self.chain_active = false;
            }
            GameState::Processing => {
                self.chain_active = true;
            }
            GameState::LevelWin | GameState::GameOver => {
                self.chain_active = false;
            }
            _ => {}
        }
    }

    /// Set the current chain phase; meaningful while Processing/Checking
    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            tracing::debug!(phase = phase.as_str(), "phase change");
            self.phase = phase;
        }
    }

    /// Begin a new resolution sequence: zero the stats
    pub fn begin_sequence(&mut self) {
        self.stats = ChainStats::default();
    }

    /// Record one chain iteration: bump depth and combo
    ///
    /// Fails with `MaxChainDepthReached` once the backstop is hit; the
    /// chain loop's own cap normally breaks first.
    pub fn begin_chain_step(&mut self) -> Result<(), EngineError> {
        if self.stats.chain_depth >= self.depth_backstop {
            tracing::warn!(
                depth = self.stats.chain_depth,
                "chain depth backstop reached"
            );
            return Err(EngineError::MaxChainDepthReached);
        }
        self.stats.chain_depth += 1;
        self.stats.current_combo += 1;
        if self.stats.current_combo > self.stats.max_combo {
            self.stats.max_combo = self.stats.current_combo;
        }
        Ok(())
    }

    /// Accumulate one wave's matches and score into the sequence stats
    pub fn record_wave(&mut self, matches: u64, score: u64) {
        self.stats.total_matches += matches;
        self.stats.total_score = self.stats.total_score.saturating_add(score);
    }

    /// Force the machine back to Idle, bypassing the adjacency table
    ///
    /// The single escape hatch, reserved for `force_stop`.
    pub fn force_reset(&mut self) {
        let from = self.current;
        if from != GameState::Idle {
            self.record_history(from, GameState::Idle);
        }
        self.previous = from;
        self.current = GameState::Idle;
        self.chain_active = false;
        self.stats = ChainStats::default();
        self.phase = GamePhase::MatchDetection;
    }
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
