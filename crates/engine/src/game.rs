//! Game facade - board, state machine, and chain controller wired together
//!
//! One `Game` instance is one level in play. Multiple games can coexist;
//! nothing here is process-global. The presentation listener is passed once
//! at construction and receives every observable effect.

use cascade_core::board::Board;
use cascade_core::chain::{ChainController, ChainReport, Opening, SpecialTrigger, StopHandle};
use cascade_core::listener::GameListener;
use cascade_core::matcher;
use cascade_core::rng::SimpleRng;
use cascade_core::state::{ChainStats, GameStateMachine};
use cascade_core::ChainConfig;
use cascade_types::{
    EngineError, GamePhase, GameState, Pos, TileKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH,
    DEFAULT_KIND_COUNT,
};

use crate::swap::evaluate_swap;

/// Construction parameters for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    pub kind_count: u8,
    pub seed: u32,
    pub chain: ChainConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            kind_count: DEFAULT_KIND_COUNT,
            seed: 1,
            chain: ChainConfig::default(),
        }
    }
}

/// A single level in play
pub struct Game<L: GameListener> {
    config: GameConfig,
    board: Board,
    state: GameStateMachine,
    chain: ChainController,
    rng: SimpleRng,
    listener: L,
}

impl<L: GameListener> Game<L> {
    /// Create a game with a randomly generated board
    pub fn new(config: GameConfig, listener: L) -> Self {
        let mut rng = SimpleRng::new(config.seed);
        let board = Board::generate(config.width, config.height, config.kind_count, &mut rng);
        Self {
            config,
            board,
            state: GameStateMachine::new(),
            chain: ChainController::new(config.chain),
            rng,
            listener,
        }
    }

    /// Create a game from a caller-supplied kind grid (`rows[v][h]`, row 0
    /// at the bottom); board dimensions come from the grid
    pub fn from_rows(
        mut config: GameConfig,
        rows: &[Vec<TileKind>],
        listener: L,
    ) -> Result<Self, EngineError> {
        let board = Board::from_rows(rows, config.kind_count)?;
        config.width = board.width();
        config.height = board.height();
        Ok(Self {
            config,
            board,
            state: GameStateMachine::new(),
            chain: ChainController::new(config.chain),
            rng: SimpleRng::new(config.seed),
            listener,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state.current()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn stats(&self) -> &ChainStats {
        self.state.stats()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Handle for aborting an in-flight chain from listener callbacks
    pub fn stop_handle(&self) -> StopHandle {
        self.chain.stop_handle()
    }

    /// Resolve any matches the generated board starts with, then hand
    /// control to the player; callable once, from Idle
    pub fn start(&mut self) -> Result<ChainReport, EngineError> {
        if self.state.current() != GameState::Idle {
            return Err(EngineError::ConcurrentOperationRejected);
        }
        self.run_chain(Opening::default())
    }

    /// Attempt a player swap of two adjacent cells
    ///
    /// On success the whole resulting chain has run to completion by the
    /// time this returns. A dead swap is undone and reported as
    /// `InvalidSwap` with the board bit-identical to before the attempt.
    pub fn try_swap(&mut self, a: Pos, b: Pos) -> Result<ChainReport, EngineError> {
        if !self.state.can_accept_input() {
            return Err(EngineError::ConcurrentOperationRejected);
        }
        if !a.is_adjacent(b) {
            tracing::debug!(?a, ?b, "swap rejected: cells not adjacent");
            return Err(EngineError::InvalidSwap);
        }
        self.board.swap(a, b)?;

        match evaluate_swap(&mut self.board, &mut self.rng, a, b) {
            Some(opening) => self.run_chain(opening),
            None => {
                // Snap back; both tiles are still present and settled
                self.board
                    .swap(b, a)
                    .map_err(|_| EngineError::BoardCorruption)?;
                Err(EngineError::InvalidSwap)
            }
        }
    }

    /// Trigger a special tile by tapping it
    pub fn trigger_special(&mut self, pos: Pos) -> Result<ChainReport, EngineError> {
        if !self.state.can_accept_input() {
            return Err(EngineError::ConcurrentOperationRejected);
        }
        let kind = self.board.kind_at(pos).ok_or(EngineError::InvalidSwap)?;
        if !kind.is_special() {
            return Err(EngineError::InvalidSwap);
        }
        self.run_chain(Opening::from_trigger(SpecialTrigger {
            pos,
            kind,
            forced_target: None,
        }))
    }

    /// Pause while awaiting input
    pub fn pause(&mut self) -> Result<(), EngineError> {
        self.apply_transition(GameState::Paused)
    }

    /// Resume from pause back to awaiting input
    pub fn resume(&mut self) -> Result<(), EngineError> {
        if self.state.current() != GameState::Paused {
            return Err(EngineError::IllegalStateTransition {
                from: self.state.current(),
                to: GameState::AwaitingInput,
            });
        }
        self.apply_transition(GameState::AwaitingInput)
    }

    /// Abort any in-flight chain and force the machine to Idle
    ///
    /// Safe to call at any time; no further callbacks fire for an aborted
    /// run.
    pub fn force_stop(&mut self) {
        self.chain.stop_handle().stop();
        if !self.chain.is_running() {
            self.state.force_reset();
        }
    }

    /// Rebuild the board with a fresh seed and start over
    ///
    /// Legal from Idle and from the ended states (LevelWin/GameOver).
    pub fn restart(&mut self, seed: u32) -> Result<ChainReport, EngineError> {
        if self.state.current() != GameState::Idle {
            self.apply_transition(GameState::Idle)?;
        }
        self.config.seed = seed;
        self.rng = SimpleRng::new(seed);
        self.board = Board::generate(
            self.config.width,
            self.config.height,
            self.config.kind_count,
            &mut self.rng,
        );
        self.start()
    }

    /// One legal normal-tile swap, if any (for hint UI)
    pub fn hint(&self) -> Option<(Pos, Pos)> {
        matcher::find_legal_swap(&self.board)
    }

    pub fn has_legal_move(&self) -> bool {
        matcher::has_legal_move(&self.board)
    }

    fn run_chain(&mut self, opening: Opening) -> Result<ChainReport, EngineError> {
        self.chain.run(
            &mut self.board,
            &mut self.state,
            &mut self.rng,
            &mut self.listener,
            opening,
        )
    }

    fn apply_transition(&mut self, to: GameState) -> Result<(), EngineError> {
        let from = self.state.current();
        if from == to {
            return Ok(());
        }
        self.state.transition(to)?;
        self.listener.on_state_changed(from, to);
        Ok(())
    }
}
