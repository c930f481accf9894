//! Chain controller - the bounded detect/resolve/settle loop
//!
//! Replaces per-match recursive re-checking with an explicit iterative loop
//! under a hard depth cap. One invocation drives the board to convergence
//! after any mutation (player swap, special trigger, shuffle):
//!
//! 1. detect matches (plus any pending special-tile triggers)
//! 2. eliminate, applying the per-depth chain score multiplier
//! 3. run blast waves for triggered special tiles, with per-wave caps
//! 4. settle animations, apply gravity and refill, settle again
//! 5. bump the combo counter and go around
//!
//! The loop always finalizes - even after an error or a stop request - so
//! the state machine can never be left stranded in `Processing`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cascade_types::{
    EngineError, GamePhase, GameState, Pos, TileKind, BLAST_CELL_SCORE,
    DEFAULT_COLOR_TRIGGER_CAP, DEFAULT_DIRECTIONAL_TRIGGER_CAP, DEFAULT_MAX_CHAIN_DEPTH,
};

use crate::board::Board;
use crate::listener::{GameListener, ResultDirective};
use crate::matcher::{find_matches, has_legal_move};
use crate::resolver::{EliminationResolver, ScoreScale};
use crate::rng::SimpleRng;
use crate::shuffle;
use crate::special;
use crate::state::{ChainStats, GameStateMachine};

/// Upper bound on blast waves within a single chain iteration
const MAX_BLAST_WAVES: u32 = 10;

/// Chain tuning knobs
///
/// The trigger caps bound how many incidentally-caught special tiles may
/// fire per blast wave; excess triggers are dropped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    /// Hard cap on chain iterations per resolution sequence
    pub max_depth: u32,
    /// Color-clear secondary triggers allowed per blast wave
    pub color_trigger_cap: u32,
    /// Line/area-bomb secondary triggers allowed per blast wave
    pub directional_trigger_cap: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_CHAIN_DEPTH,
            color_trigger_cap: DEFAULT_COLOR_TRIGGER_CAP,
            directional_trigger_cap: DEFAULT_DIRECTIONAL_TRIGGER_CAP,
        }
    }
}

/// A special tile that must fire: position, kind, and an optional forced
/// color-clear target (set when the player swapped it with a normal tile)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTrigger {
    pub pos: Pos,
    pub kind: TileKind,
    pub forced_target: Option<u8>,
}

/// Work seeding one chain run
///
/// A plain match swap carries `origin`; swaps involving special tiles add
/// `triggers`; two-special combos precompute their union into `clear`.
#[derive(Debug, Clone, Default)]
pub struct Opening {
    pub origin: Option<(Pos, Pos)>,
    pub triggers: Vec<SpecialTrigger>,
    pub clear: Vec<Pos>,
}

impl Opening {
    pub fn from_swap(a: Pos, b: Pos) -> Self {
        Self {
            origin: Some((a, b)),
            ..Self::default()
        }
    }

    pub fn from_trigger(trigger: SpecialTrigger) -> Self {
        Self {
            triggers: vec![trigger],
            ..Self::default()
        }
    }
}

/// Outcome of one chain run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainReport {
    pub stats: ChainStats,
    /// The board had no legal move after convergence and was reshuffled
    pub shuffled: bool,
    /// The run was aborted via stop; state was forced to Idle
    pub stopped: bool,
    /// The loop broke at the depth cap rather than by convergence
    pub depth_capped: bool,
    pub final_state: GameState,
}

/// Cooperative stop signal, safe to flip from listener callbacks
///
/// The loop honors it at the next phase boundary; an in-flight elimination
/// wave always runs to completion or is discarded wholesale.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives detection, elimination, gravity and refill to convergence
#[derive(Debug, Default)]
pub struct ChainController {
    config: ChainConfig,
    resolver: EliminationResolver,
    stop: StopHandle,
    running: bool,
}

impl ChainController {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            resolver: EliminationResolver::new(),
            stop: StopHandle::default(),
            running: false,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle for aborting an in-flight run from a listener callback
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run the chain loop to convergence
    ///
    /// Rejects re-entry while a run is in flight. Errors inside a phase
    /// abort the loop (logged) but the finalize step still executes, so
    /// the game never deadlocks in `Processing`.
    pub fn run<L: GameListener>(
        &mut self,
        board: &mut Board,
        state: &mut GameStateMachine,
        rng: &mut SimpleRng,
        listener: &mut L,
        opening: Opening,
    ) -> Result<ChainReport, EngineError> {
        if self.running {
            return Err(EngineError::ConcurrentOperationRejected);
        }
        self.running = true;
        self.stop.clear();
        state.begin_sequence();

        if let Err(err) = set_state(state, listener, GameState::Processing) {
            self.running = false;
            return Err(err);
        }

        let origin = opening.origin;
        let mut triggers = opening.triggers;
        let mut clear = opening.clear;
        let mut depth: u32 = 0;
        let mut depth_capped = false;

        loop {
            if self.stop.is_set() {
                break;
            }
            if depth >= self.config.max_depth {
                tracing::warn!(depth, "max chain depth reached, breaking early");
                depth_capped = true;
                break;
            }
            if set_state(state, listener, GameState::Processing).is_err() {
                break;
            }

            set_phase(state, listener, GamePhase::MatchDetection);
            let result = find_matches(board);
            if !result.has_matches() && triggers.is_empty() && clear.is_empty() {
                break;
            }

            let scale = ScoreScale::at_depth(depth);
            set_phase(state, listener, GamePhase::Elimination);
            if result.has_matches() {
                let wave_origin = if depth == 0 { origin } else { None };
                match self
                    .resolver
                    .resolve(board, &result, wave_origin, scale, listener)
                {
                    Ok(outcome) => {
                        state.record_wave(result.groups.len() as u64, outcome.score);
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "elimination failed, aborting chain");
                        break;
                    }
                }
            }
            let blast_score =
                self.run_blast_waves(board, &mut triggers, &mut clear, scale, rng, listener);
            if blast_score > 0 {
                state.record_wave(0, blast_score);
            }

            if set_state(state, listener, GameState::Animating).is_err() {
                break;
            }
            listener.on_animation_complete().wait();
            if self.stop.is_set() {
                break;
            }

            if set_state(state, listener, GameState::Falling).is_err() {
                break;
            }
            set_phase(state, listener, GamePhase::GravityFall);
            let moves = board.apply_gravity();
            set_phase(state, listener, GamePhase::Refill);
            let refills = board.refill(rng);
            listener.on_move_down(&moves, &refills).wait();
            board.clear_moving();
            if self.stop.is_set() {
                break;
            }

            if set_state(state, listener, GameState::Checking).is_err() {
                break;
            }
            set_phase(state, listener, GamePhase::ComboCheck);
            if state.begin_chain_step().is_err() {
                tracing::warn!("combo depth backstop reached, ending chain");
                depth_capped = true;
                break;
            }
            depth += 1;
        }

        let report = self.finalize(board, state, rng, listener, depth_capped);
        self.running = false;
        Ok(report)
    }

    /// Fire pending special triggers in capped waves until the queue drains
    ///
    /// Removed special tiles enqueue their own trigger for the next wave;
    /// triggers past a wave's cap are dropped, bounding runtime.
    fn run_blast_waves<L: GameListener>(
        &self,
        board: &mut Board,
        triggers: &mut Vec<SpecialTrigger>,
        clear: &mut Vec<Pos>,
        scale: ScoreScale,
        rng: &mut SimpleRng,
        listener: &mut L,
    ) -> u64 {
        let mut total = 0u64;
        let mut wave = 0;
        while (!triggers.is_empty() || !clear.is_empty()) && wave < MAX_BLAST_WAVES {
            let mut affected: Vec<Pos> = std::mem::take(clear);
            let mut color_fired = 0u32;
            let mut directional_fired = 0u32;

            for trig in std::mem::take(triggers) {
                match trig.kind {
                    TileKind::ColorClear => {
                        if color_fired >= self.config.color_trigger_cap {
                            tracing::warn!(pos = ?trig.pos, "color-clear trigger dropped by wave cap");
                            continue;
                        }
                        color_fired += 1;
                        affected.push(trig.pos);
                        let target = trig
                            .forced_target
                            .or_else(|| special::random_present_kind(board, rng));
                        if let Some(target) = target {
                            affected.extend(special::color_clear_cells(board, target));
                        }
                    }
                    TileKind::LineHorizontal | TileKind::LineVertical | TileKind::AreaBomb => {
                        if directional_fired >= self.config.directional_trigger_cap {
                            tracing::warn!(pos = ?trig.pos, "directional trigger dropped by wave cap");
                            continue;
                        }
                        directional_fired += 1;
                        affected.push(trig.pos);
                        affected.extend(special::effect_cells(board, trig.pos, trig.kind));
                    }
                    TileKind::Normal(_) => {}
                }
            }

            affected.sort_unstable();
            affected.dedup();

            let mut wave_score = 0u64;
            for pos in affected {
                if let Some(tile) = board.remove(pos) {
                    listener.on_tile_removed(pos, tile.kind());
                    wave_score += BLAST_CELL_SCORE;
                    if tile.kind().is_special() {
                        triggers.push(SpecialTrigger {
                            pos,
                            kind: tile.kind(),
                            forced_target: None,
                        });
                    }
                }
            }
            if wave_score > 0 {
                let scaled = scale.apply(wave_score);
                listener.on_score_update(scaled);
                total += scaled;
            }
            wave += 1;
        }

        if !triggers.is_empty() || !clear.is_empty() {
            tracing::warn!("blast wave cap reached, dropping remaining triggers");
            triggers.clear();
            clear.clear();
        }
        total
    }

    /// Close out a run: result check, end states, shuffle when stuck
    ///
    /// Runs even when the loop aborted, so state always leaves `Processing`.
    fn finalize<L: GameListener>(
        &mut self,
        board: &mut Board,
        state: &mut GameStateMachine,
        rng: &mut SimpleRng,
        listener: &mut L,
        depth_capped: bool,
    ) -> ChainReport {
        let stats = *state.stats();

        if self.stop.is_set() {
            state.force_reset();
            return ChainReport {
                stats,
                shuffled: false,
                stopped: true,
                depth_capped,
                final_state: GameState::Idle,
            };
        }

        let _ = set_state(state, listener, GameState::Checking);
        set_phase(state, listener, GamePhase::ResultCheck);

        let mut shuffled = false;
        match listener.on_result_check(&stats) {
            ResultDirective::Win => {
                let _ = set_state(state, listener, GameState::LevelWin);
            }
            ResultDirective::Lose => {
                let _ = set_state(state, listener, GameState::GameOver);
            }
            ResultDirective::Stop => {
                state.force_reset();
                return ChainReport {
                    stats,
                    shuffled: false,
                    stopped: true,
                    depth_capped,
                    final_state: GameState::Idle,
                };
            }
            ResultDirective::Continue => {
                if !has_legal_move(board) {
                    let _ = set_state(state, listener, GameState::Processing);
                    let _ = set_state(state, listener, GameState::Falling);
                    let _ = set_state(state, listener, GameState::Shuffling);
                    shuffled = shuffle::ensure_playable(board, rng) > 0;
                    let _ = set_state(state, listener, GameState::Checking);
                }
                let _ = set_state(state, listener, GameState::AwaitingInput);
            }
        }

        ChainReport {
            stats,
            shuffled,
            stopped: false,
            depth_capped,
            final_state: state.current(),
        }
    }
}

/// Apply a transition and notify the listener on success
fn set_state<L: GameListener>(
    state: &mut GameStateMachine,
    listener: &mut L,
    to: GameState,
) -> Result<(), EngineError> {
    let from = state.current();
    if from == to {
        return Ok(());
    }
    state.transition(to)?;
    listener.on_state_changed(from, to);
    Ok(())
}

fn set_phase<L: GameListener>(state: &mut GameStateMachine, listener: &mut L, phase: GamePhase) {
    if state.phase() != phase {
        state.set_phase(phase);
        listener.on_phase_changed(phase);
    }
}
