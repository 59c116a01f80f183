//! Game session: lifecycle, timing and the surface the UI talks to.
//!
//! All state lives in one `GameSession` and is mutated from one timeline.
//! The driver calls [`GameSession::run_due_ticks`] whenever it wakes up; the
//! session pulls the current time from its clock and runs every logic and
//! render tick that has come due, in order.

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::action::Direction;
use super::arbiter::{DirectionArbiter, RequestOutcome, TurnMarkers};
use super::clock::Clock;
use super::config::GameConfig;
use super::engine::{Board, CollisionType, GameEngine, StepResult};
use super::grid::{Cell, Snake};
use super::motion::{snap, MotionFrame, MotionInterpolator, Point};
use super::scheduler::{turn_step, MoveTimer, TickKind, TickScheduler};
use super::scores::{sample_scores, HighScoreEntry, RankedTable, ScoreStore};

/// Which screen the game is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    Ready,
    Playing,
    GameOver,
    /// Score table view; the grid is frozen while it is shown
    HighScores,
}

/// Read-only copy of the state a UI needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub snake: Vec<Cell>,
    pub food: Cell,
    pub score: u32,
    pub phase: GamePhase,
    pub direction: Direction,
    #[serde(skip)]
    pub speed: Duration,
}

/// Ticks run by one call to `run_due_ticks`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub logic: usize,
    pub render: usize,
}

type StateObserver = Box<dyn FnMut(&GameSnapshot)>;

pub struct GameSession<C: Clock, S: ScoreStore> {
    config: GameConfig,
    engine: GameEngine,
    board: Board,
    arbiter: DirectionArbiter,
    scheduler: TickScheduler,
    move_timer: MoveTimer,
    interpolator: MotionInterpolator,
    phase: GamePhase,
    render_positions: Vec<Point>,
    render_fraction: f64,
    last_collision: Option<CollisionType>,
    high_scores: RankedTable,
    store: S,
    clock: C,
    observer: Option<StateObserver>,
}

impl<C: Clock, S: ScoreStore> GameSession<C, S> {
    /// Create a session in the `Ready` phase. The ranked table is loaded
    /// from `store` now, falling back to the sample table.
    pub fn new(config: GameConfig, clock: C, store: S) -> Result<Self> {
        Self::from_engine(GameEngine::new(config), clock, store)
    }

    /// Same as `new` with reproducible food placement
    pub fn with_seed(config: GameConfig, clock: C, store: S, seed: u64) -> Result<Self> {
        Self::from_engine(GameEngine::with_seed(config, seed), clock, store)
    }

    fn from_engine(mut engine: GameEngine, clock: C, store: S) -> Result<Self> {
        let config = engine.config().clone();
        config
            .validate()
            .map_err(|msg| anyhow!("Invalid game config: {}", msg))?;

        let board = engine.spawn_board();
        let high_scores = load_high_scores(&store, config.max_high_scores);

        Ok(Self {
            arbiter: DirectionArbiter::new(config.start_direction, &config),
            scheduler: TickScheduler::new(config.refresh_interval),
            move_timer: MoveTimer::default(),
            interpolator: MotionInterpolator::new(),
            phase: GamePhase::Ready,
            render_positions: snap(&board.snake),
            render_fraction: 0.0,
            last_collision: None,
            board,
            engine,
            config,
            high_scores,
            store,
            clock,
            observer: None,
        })
    }

    /// Register a callback fired after every state-changing operation
    pub fn set_state_observer(&mut self, observer: impl FnMut(&GameSnapshot) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    // Lifecycle

    /// Begin a new game from a fresh board
    pub fn start(&mut self) {
        self.reset_board();
        let now = self.clock.now();

        self.phase = GamePhase::Playing;
        self.move_timer.start(now, self.board.speed);
        self.scheduler.start(now);
        self.render_tick(now);

        info!(food = ?self.board.food, "game started");
        self.notify();
    }

    /// Stop any running game and return to `Ready` with a fresh board
    pub fn reset(&mut self) {
        self.reset_board();
        self.phase = GamePhase::Ready;
        self.notify();
    }

    /// Stop ticking and freeze the board. The final score stays available
    /// for `record_score`. Safe to call repeatedly.
    pub fn end_game(&mut self) {
        self.scheduler.stop();
        if self.phase != GamePhase::Playing {
            return;
        }

        self.phase = GamePhase::GameOver;
        info!(
            score = self.board.score,
            length = self.board.snake.len(),
            collision = ?self.last_collision,
            "game over"
        );
        self.notify();
    }

    /// Show the score table. Leaving a running game here abandons it.
    pub fn show_high_scores(&mut self) {
        self.scheduler.stop();
        self.phase = GamePhase::HighScores;
        self.notify();
    }

    pub fn return_to_menu(&mut self) {
        self.scheduler.stop();
        self.phase = GamePhase::Ready;
        self.notify();
    }

    /// Replace snake, food and heading, keeping score and speed. Any turn
    /// in flight is dropped.
    pub fn restore(&mut self, snake: Snake, food: Cell, direction: Direction) {
        self.board.snake = snake;
        self.board.food = food;
        self.arbiter.reset(direction);
        self.render_positions = snap(&self.board.snake);
        self.notify();
    }

    fn reset_board(&mut self) {
        self.scheduler.stop();
        self.board = self.engine.spawn_board();
        self.arbiter.reset(self.config.start_direction);
        self.move_timer = MoveTimer::default();
        self.render_positions = snap(&self.board.snake);
        self.render_fraction = 0.0;
        self.last_collision = None;
    }

    // Input

    /// Ask for a new heading. Ignored unless a game is running.
    pub fn request_direction(&mut self, direction: Direction) -> RequestOutcome {
        if self.phase != GamePhase::Playing {
            debug!(?direction, phase = ?self.phase, "direction ignored outside play");
            return RequestOutcome::Rejected;
        }

        let now = self.clock.now();
        let fraction = self.move_timer.elapsed_fraction(now, self.board.speed);
        let outcome = self.arbiter.request(direction, fraction);
        debug!(?direction, fraction, ?outcome, "direction requested");
        outcome
    }

    // Ticks

    /// Run every tick due at the clock's current time
    pub fn run_due_ticks(&mut self) -> TickReport {
        let now = self.clock.now();
        let mut report = TickReport::default();

        while let Some(kind) = self.scheduler.pop_due(now) {
            match kind {
                TickKind::Logic => {
                    self.logic_tick(now);
                    report.logic += 1;
                }
                TickKind::Render => {
                    self.render_tick(now);
                    report.render += 1;
                }
            }
        }
        report
    }

    /// How long the driver may sleep before the next tick, `None` when
    /// nothing is scheduled
    pub fn next_tick_in(&self) -> Option<Duration> {
        self.scheduler.time_until_next(self.clock.now())
    }

    /// Advance the grid by one cell now. Returns `None` outside play.
    pub fn advance(&mut self) -> Option<StepResult> {
        let now = self.clock.now();
        self.advance_at(now)
    }

    fn logic_tick(&mut self, now: Duration) {
        let speed = self.board.speed;

        if self.arbiter.turn().in_progress {
            let step = turn_step(
                self.config.refresh_interval,
                speed,
                self.config.turn_duration_factor,
            );
            if self.arbiter.progress_turn(step) {
                debug!(direction = ?self.arbiter.current(), "turn committed");
            }
        } else if self.arbiter.queued().is_some()
            && self
                .move_timer
                .early_turn_open(now, speed, self.config.early_turn_lead)
        {
            // Unreachable today: `request` starts a turn with every queued
            // direction and the commit clears the queue
            if let Some(direction) = self.arbiter.fire_queued() {
                debug!(?direction, "queued turn fired early");
            }
        }

        if self.move_timer.is_due(now) {
            self.advance_at(now);
        }
    }

    fn advance_at(&mut self, now: Duration) -> Option<StepResult> {
        if self.phase != GamePhase::Playing {
            return None;
        }

        let direction = self.arbiter.current();
        let result = self
            .engine
            .step(&mut self.board, direction, self.arbiter.markers_mut());
        self.move_timer.record_move(now, self.board.speed);

        if let Some(collision) = result.collision {
            self.last_collision = Some(collision);
            self.end_game();
            return Some(result);
        }

        if result.board_full {
            info!(length = self.board.snake.len(), "board filled");
            self.render_positions = snap(&self.board.snake);
            self.render_fraction = 0.0;
            self.end_game();
            return Some(result);
        }

        debug!(
            head = ?self.board.snake.head(),
            ?direction,
            ate_food = result.ate_food,
            score = self.board.score,
            "advanced"
        );
        self.render_positions = snap(&self.board.snake);
        self.render_fraction = 0.0;
        self.notify();
        Some(result)
    }

    fn render_tick(&mut self, now: Duration) {
        let opening = self.phase == GamePhase::Playing && !self.move_timer.has_moved;
        self.render_fraction = if opening {
            self.config.first_frame_fraction
        } else {
            self.move_timer.elapsed_fraction(now, self.board.speed)
        };

        let frame = MotionFrame {
            snake: &self.board.snake,
            direction: self.arbiter.current(),
            turn: self.arbiter.turn(),
            markers: self.arbiter.markers(),
            elapsed_fraction: self.render_fraction,
            opening,
        };
        self.render_positions = self.interpolator.positions(&frame);
    }

    // Scores

    /// Add the current score to the ranked table and persist it. Returns the
    /// zero-based rank, or `None` if the score did not make the table.
    pub fn record_score(&mut self, name: &str) -> Option<usize> {
        let entry = HighScoreEntry::new(name, self.board.score, Utc::now());
        let recorded_name = entry.name.clone();
        let rank = self.high_scores.insert(entry);

        if let Err(err) = self.store.save_ranked_scores(self.high_scores.entries()) {
            warn!(error = %err, "failed to save high scores");
        }
        info!(name = %recorded_name, score = self.board.score, ?rank, "score recorded");
        rank
    }

    pub fn high_scores(&self) -> &[HighScoreEntry] {
        self.high_scores.entries()
    }

    // Queries

    pub fn current_state(&self) -> GameSnapshot {
        GameSnapshot {
            snake: self.board.snake.cells().to_vec(),
            food: self.board.food,
            score: self.board.score,
            phase: self.phase,
            direction: self.arbiter.current(),
            speed: self.board.speed,
        }
    }

    /// Display positions for the latest frame, one per segment
    pub fn render_positions(&self) -> &[Point] {
        &self.render_positions
    }

    /// Elapsed fraction used for the latest frame
    pub fn render_fraction(&self) -> f64 {
        self.render_fraction
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn arbiter(&self) -> &DirectionArbiter {
        &self.arbiter
    }

    pub fn turn_markers(&self) -> &TurnMarkers {
        self.arbiter.markers()
    }

    pub fn last_collision(&self) -> Option<CollisionType> {
        self.last_collision
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn notify(&mut self) {
        if self.observer.is_none() {
            return;
        }
        let snapshot = self.current_state();
        if let Some(observer) = self.observer.as_mut() {
            observer(&snapshot);
        }
    }
}

fn load_high_scores<S: ScoreStore>(store: &S, capacity: usize) -> RankedTable {
    let entries = match store.load_ranked_scores() {
        Ok(Some(entries)) => entries,
        Ok(None) => sample_scores(Utc::now()),
        Err(err) => {
            warn!(error = %err, "failed to load high scores, using sample table");
            sample_scores(Utc::now())
        }
    };
    RankedTable::from_entries(entries, capacity)
}
