//! Engine runtime - runs the sync game loop on its own thread
//!
//! Commands arrive over a bounded tokio channel and are applied one at a
//! time; events stream back over an unbounded channel. While a chain is in
//! flight the engine blocks on its settle barriers, which the presentation
//! completes through the [`AnimationGate`] (or which resolve immediately in
//! `auto_settle` mode).

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::mpsc;

use cascade_core::board::TileMove;
use cascade_core::listener::{GameListener, ResultDirective, Settle};
use cascade_core::state::ChainStats;
use cascade_engine::{Game, GameConfig};
use cascade_types::{GamePhase, GameState, Pos, TileKind};

use crate::event::{CellRecord, EngineEvent, MoveRecord};

/// Commands accepted by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Swap { a: (i8, i8), b: (i8, i8) },
    TriggerSpecial { pos: (i8, i8) },
    Pause,
    Resume,
    ForceStop,
    Restart { seed: u32 },
    Shutdown,
}

/// The presentation's handle for completing settle barriers
///
/// Completions are counted as credits, so acking an event slightly before
/// the engine arms the matching barrier cannot be lost: the next `arm`
/// consumes a stored credit and resolves immediately.
#[derive(Debug, Clone, Default)]
pub struct AnimationGate {
    state: Arc<Mutex<GateState>>,
}

#[derive(Debug, Default)]
struct GateState {
    credits: u32,
    waiter: Option<std_mpsc::Sender<()>>,
}

impl AnimationGate {
    fn arm(&self) -> Settle {
        let Ok(mut state) = self.state.lock() else {
            return Settle::ready();
        };
        if state.credits > 0 {
            state.credits -= 1;
            return Settle::ready();
        }
        let (tx, rx) = std_mpsc::channel();
        state.waiter = Some(tx);
        Settle::from_receiver(rx, 1)
    }

    /// Complete the pending barrier, or bank a credit for the next one
    pub fn complete(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match state.waiter.take() {
            Some(tx) => {
                let _ = tx.send(());
            }
            None => state.credits += 1,
        }
    }
}

/// Where the quota/step tracker deposits the next result-check verdict
#[derive(Debug, Clone, Default)]
pub struct VerdictSlot {
    inner: Arc<Mutex<ResultDirective>>,
}

impl VerdictSlot {
    pub fn set(&self, directive: ResultDirective) {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = directive;
        }
    }

    fn get(&self) -> ResultDirective {
        self.inner
            .lock()
            .map(|inner| *inner)
            .unwrap_or(ResultDirective::Continue)
    }
}

/// Listener forwarding every callback into the event channel
struct ChannelListener {
    events: mpsc::UnboundedSender<EngineEvent>,
    gate: AnimationGate,
    verdict: VerdictSlot,
    auto_settle: bool,
}

impl ChannelListener {
    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn settle_point(&self) -> Settle {
        if self.auto_settle {
            Settle::ready()
        } else {
            self.gate.arm()
        }
    }
}

impl GameListener for ChannelListener {
    fn on_score_update(&mut self, amount: u64) {
        self.emit(EngineEvent::ScoreUpdate { amount });
    }

    fn on_tile_removed(&mut self, pos: Pos, kind: TileKind) {
        self.emit(EngineEvent::TileRemoved {
            h: pos.h,
            v: pos.v,
            kind: kind.code(),
        });
    }

    fn on_special_tile_spawned(&mut self, pos: Pos, kind: TileKind) {
        self.emit(EngineEvent::SpecialSpawned {
            h: pos.h,
            v: pos.v,
            kind: kind.code(),
        });
    }

    fn on_state_changed(&mut self, from: GameState, to: GameState) {
        self.emit(EngineEvent::StateChanged {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        });
    }

    fn on_phase_changed(&mut self, phase: GamePhase) {
        self.emit(EngineEvent::PhaseChanged {
            phase: phase.as_str().to_string(),
        });
    }

    fn on_move_down(&mut self, moves: &[TileMove], refills: &[Pos]) -> Settle {
        self.emit(EngineEvent::MoveDown {
            moves: moves
                .iter()
                .map(|m| MoveRecord {
                    from: CellRecord {
                        h: m.from.h,
                        v: m.from.v,
                    },
                    to: CellRecord { h: m.to.h, v: m.to.v },
                    kind: m.kind.code(),
                })
                .collect(),
            refills: refills
                .iter()
                .map(|p| CellRecord { h: p.h, v: p.v })
                .collect(),
        });
        self.settle_point()
    }

    fn on_animation_complete(&mut self) -> Settle {
        self.settle_point()
    }

    fn on_result_check(&mut self, stats: &ChainStats) -> ResultDirective {
        self.emit(EngineEvent::ResultCheck {
            total_matches: stats.total_matches,
            total_score: stats.total_score,
            max_combo: stats.max_combo,
            chain_depth: stats.chain_depth,
        });
        self.verdict.get()
    }
}

/// Runtime construction parameters
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    pub game: GameConfig,
    /// Resolve settle barriers immediately (headless operation)
    pub auto_settle: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            auto_settle: true,
        }
    }
}

/// Running engine instance
pub struct EngineRuntime {
    commands: mpsc::Sender<EngineCommand>,
    events: mpsc::UnboundedReceiver<EngineEvent>,
    gate: AnimationGate,
    verdict: VerdictSlot,
    handle: Option<JoinHandle<()>>,
}

impl EngineRuntime {
    /// Spawn the engine thread and start the game
    pub fn start(config: RuntimeConfig) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<EngineCommand>(32);
        let (evt_tx, evt_rx) = mpsc::unbounded_channel::<EngineEvent>();
        let gate = AnimationGate::default();
        let verdict = VerdictSlot::default();

        let listener = ChannelListener {
            events: evt_tx,
            gate: gate.clone(),
            verdict: verdict.clone(),
            auto_settle: config.auto_settle,
        };

        let handle = std::thread::spawn(move || {
            let mut game = Game::new(config.game, listener);
            match game.start() {
                Ok(report) => emit_report(&game, report),
                Err(err) => game.listener_mut().emit(EngineEvent::CommandRejected {
                    code: err.code().to_string(),
                }),
            }

            while let Some(cmd) = cmd_rx.blocking_recv() {
                match cmd {
                    EngineCommand::Swap { a, b } => {
                        let result = game.try_swap(Pos::new(a.0, a.1), Pos::new(b.0, b.1));
                        emit_outcome(&mut game, result);
                    }
                    EngineCommand::TriggerSpecial { pos } => {
                        let result = game.trigger_special(Pos::new(pos.0, pos.1));
                        emit_outcome(&mut game, result);
                    }
                    EngineCommand::Pause => {
                        if let Err(err) = game.pause() {
                            emit_rejection(&mut game, err);
                        }
                    }
                    EngineCommand::Resume => {
                        if let Err(err) = game.resume() {
                            emit_rejection(&mut game, err);
                        }
                    }
                    EngineCommand::ForceStop => {
                        game.force_stop();
                    }
                    EngineCommand::Restart { seed } => {
                        let result = game.restart(seed);
                        emit_outcome(&mut game, result);
                    }
                    EngineCommand::Shutdown => break,
                }
            }
        });

        Self {
            commands: cmd_tx,
            events: evt_rx,
            gate,
            verdict,
            handle: Some(handle),
        }
    }

    /// Queue a command; false when the engine thread is gone
    pub async fn send(&self, command: EngineCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Next event off the stream; None once the engine shut down
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events.recv().await
    }

    /// Non-blocking event poll
    pub fn try_next_event(&mut self) -> Option<EngineEvent> {
        self.events.try_recv().ok()
    }

    /// Complete the currently pending settle barrier (or bank a credit)
    pub fn settle(&self) {
        self.gate.complete();
    }

    /// Deposit the verdict returned by the next result check
    pub fn set_verdict(&self, directive: ResultDirective) {
        self.verdict.set(directive);
    }

    /// Stop the engine thread and wait for it to exit
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(EngineCommand::Shutdown).await;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn emit_outcome(
    game: &mut Game<ChannelListener>,
    result: Result<cascade_core::ChainReport, cascade_types::EngineError>,
) {
    match result {
        Ok(report) => emit_report(game, report),
        Err(err) => emit_rejection(game, err),
    }
}

fn emit_report(game: &Game<ChannelListener>, report: cascade_core::ChainReport) {
    game.listener().emit(EngineEvent::ChainFinished {
        total_matches: report.stats.total_matches,
        total_score: report.stats.total_score,
        max_combo: report.stats.max_combo,
        chain_depth: report.stats.chain_depth,
        shuffled: report.shuffled,
        stopped: report.stopped,
    });
}

fn emit_rejection(game: &mut Game<ChannelListener>, err: cascade_types::EngineError) {
    tracing::debug!(code = err.code(), "command rejected");
    game.listener_mut().emit(EngineEvent::CommandRejected {
        code: err.code().to_string(),
    });
}
