//! Full-engine integration: swaps, quotas, determinism, stuck boards

use cascade::core::board::TileMove;
use cascade::core::state::ChainStats;
use cascade::core::{GameListener, ResultDirective, Settle};
use cascade::engine::{Game, GameConfig};
use cascade::types::{EngineError, GameState, Pos, TileKind};

const N0: TileKind = TileKind::Normal(0);

/// Route engine logs (rejected transitions, depth-cap warnings) through
/// RUST_LOG when debugging a failing test
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn quiet_rows() -> Vec<Vec<TileKind>> {
    let mut rows = Vec::new();
    for v in 0..9 {
        let mut row = Vec::new();
        for h in 0..9 {
            row.push(TileKind::Normal(2 + (h % 2) as u8 + 2 * (v % 2) as u8));
        }
        rows.push(row);
    }
    rows
}

fn rows_with_prepared_move() -> Vec<Vec<TileKind>> {
    let mut rows = quiet_rows();
    rows[4][0] = N0;
    rows[4][1] = N0;
    rows[5][2] = N0;
    rows
}

/// Presentation stand-in: tracks a clear quota and declares the result
struct QuotaTracker {
    target_kind: TileKind,
    remaining: u32,
    steps_left: u32,
    score: u64,
}

impl QuotaTracker {
    fn new(target_kind: TileKind, quota: u32, steps: u32) -> Self {
        Self {
            target_kind,
            remaining: quota,
            steps_left: steps,
            score: 0,
        }
    }
}

impl GameListener for QuotaTracker {
    fn on_score_update(&mut self, amount: u64) {
        self.score += amount;
    }

    fn on_tile_removed(&mut self, _pos: Pos, kind: TileKind) {
        if kind == self.target_kind {
            self.remaining = self.remaining.saturating_sub(1);
        }
    }

    fn on_result_check(&mut self, _stats: &ChainStats) -> ResultDirective {
        if self.remaining == 0 {
            ResultDirective::Win
        } else if self.steps_left == 0 {
            ResultDirective::Lose
        } else {
            ResultDirective::Continue
        }
    }
}

#[test]
fn test_quota_win_flow() {
    init_tracing();
    // Clearing three kind-0 tiles wins the level; the prepared move
    // clears exactly that line.
    let mut game = Game::from_rows(
        GameConfig::default(),
        &rows_with_prepared_move(),
        QuotaTracker::new(N0, 3, 10),
    )
    .unwrap();
    game.start().unwrap();
    assert_eq!(game.state(), GameState::AwaitingInput);

    let report = game.try_swap(Pos::new(2, 5), Pos::new(2, 4)).unwrap();
    assert_eq!(report.final_state, GameState::LevelWin);
    assert_eq!(game.state(), GameState::LevelWin);
    assert_eq!(game.listener().remaining, 0);
    assert!(game.listener().score >= 300);
}

#[test]
fn test_out_of_steps_loses() {
    let mut game = Game::from_rows(
        GameConfig::default(),
        &rows_with_prepared_move(),
        QuotaTracker::new(N0, 1000, 0),
    )
    .unwrap();
    let report = game.start().unwrap();
    assert_eq!(report.final_state, GameState::GameOver);
    // No further input is accepted
    assert_eq!(
        game.try_swap(Pos::new(2, 5), Pos::new(2, 4)).unwrap_err(),
        EngineError::ConcurrentOperationRejected
    );
}

#[test]
fn test_rejected_swap_changes_nothing_observable() {
    struct Spy {
        events: usize,
    }
    impl GameListener for Spy {
        fn on_score_update(&mut self, _amount: u64) {
            self.events += 1;
        }
        fn on_tile_removed(&mut self, _pos: Pos, _kind: TileKind) {
            self.events += 1;
        }
        fn on_special_tile_spawned(&mut self, _pos: Pos, _kind: TileKind) {
            self.events += 1;
        }
    }

    let mut game =
        Game::from_rows(GameConfig::default(), &rows_with_prepared_move(), Spy { events: 0 })
            .unwrap();
    game.start().unwrap();
    let events_after_start = game.listener().events;
    let before = game.board().clone();

    let err = game.try_swap(Pos::new(6, 2), Pos::new(7, 2)).unwrap_err();
    assert_eq!(err, EngineError::InvalidSwap);
    assert_eq!(game.board(), &before);
    assert_eq!(game.listener().events, events_after_start);
}

#[test]
fn test_same_seed_same_outcome() {
    let config = GameConfig {
        seed: 777,
        ..GameConfig::default()
    };
    let mut first = Game::new(config, CountingListener::default());
    let mut second = Game::new(config, CountingListener::default());

    let report_a = first.start().unwrap();
    let report_b = second.start().unwrap();

    assert_eq!(report_a.stats, report_b.stats);
    assert_eq!(first.board(), second.board());
    assert_eq!(first.listener().removed, second.listener().removed);
}

#[derive(Default)]
struct CountingListener {
    removed: Vec<(Pos, TileKind)>,
}

impl GameListener for CountingListener {
    fn on_tile_removed(&mut self, pos: Pos, kind: TileKind) {
        self.removed.push((pos, kind));
    }
}

#[test]
fn test_settle_barriers_are_awaited_in_order() {
    /// Listener that hands out real barriers completed by worker threads,
    /// proving the engine waits at each settle point before proceeding.
    #[derive(Default)]
    struct SlowAnimator {
        waves: usize,
    }
    impl GameListener for SlowAnimator {
        fn on_move_down(&mut self, _moves: &[TileMove], _refills: &[Pos]) -> Settle {
            self.waves += 1;
            let (tx, rx) = std::sync::mpsc::channel();
            // Three concurrent tweens, jointly awaited
            for _ in 0..3 {
                let tx = tx.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(std::time::Duration::from_millis(2));
                    let _ = tx.send(());
                });
            }
            Settle::from_receiver(rx, 3)
        }
    }

    let mut game = Game::from_rows(
        GameConfig::default(),
        &rows_with_prepared_move(),
        SlowAnimator::default(),
    )
    .unwrap();
    game.start().unwrap();
    let report = game.try_swap(Pos::new(2, 5), Pos::new(2, 4)).unwrap();
    assert!(game.listener().waves >= 1);
    assert_eq!(report.final_state, GameState::AwaitingInput);
    // All moving flags were cleared after the final settle
    assert!(game.board().tiles().all(|(_, t)| !t.is_moving()));
}

#[test]
fn test_special_spawn_then_manual_trigger() {
    // A prepared vertical four-line with a gap at (2,4): swapping (3,4)
    // into the gap completes it, spawning a line tile at the swap cell.
    let mut rows = quiet_rows();
    rows[3][2] = N0;
    rows[5][2] = N0;
    rows[6][2] = N0;
    rows[4][3] = N0;

    struct SpawnWatch {
        spawned: Option<(Pos, TileKind)>,
    }
    impl GameListener for SpawnWatch {
        fn on_special_tile_spawned(&mut self, pos: Pos, kind: TileKind) {
            // Keep the first spawn; cascades may add more
            if self.spawned.is_none() {
                self.spawned = Some((pos, kind));
            }
        }
    }

    let mut game =
        Game::from_rows(GameConfig::default(), &rows, SpawnWatch { spawned: None }).unwrap();
    game.start().unwrap();
    assert!(game.listener().spawned.is_none());

    game.try_swap(Pos::new(3, 4), Pos::new(2, 4)).unwrap();
    let (pos, kind) = game.listener().spawned.expect("a special should spawn");
    assert_eq!(pos, Pos::new(2, 4));
    assert_eq!(kind, TileKind::LineVertical);

    // The spawned tile may survive cascades; tap it if it is still there
    if game.board().kind_at(pos) == Some(kind) {
        let report = game.trigger_special(pos).unwrap();
        assert!(report.stats.total_score > 0);
    }
}

#[test]
fn test_multiple_games_are_independent() {
    let mut a = Game::from_rows(
        GameConfig::default(),
        &rows_with_prepared_move(),
        CountingListener::default(),
    )
    .unwrap();
    let mut b = Game::from_rows(
        GameConfig::default(),
        &rows_with_prepared_move(),
        CountingListener::default(),
    )
    .unwrap();

    a.start().unwrap();
    b.start().unwrap();
    a.try_swap(Pos::new(2, 5), Pos::new(2, 4)).unwrap();

    // Game b saw none of game a's activity
    assert!(b.listener().removed.is_empty());
    assert_eq!(b.state(), GameState::AwaitingInput);
}
