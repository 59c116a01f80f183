//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies:
//! the grid model, direction arbitration, tick scheduling, motion interpolation
//! and the session that ties them together.

pub mod action;
pub mod arbiter;
pub mod clock;
pub mod config;
pub mod engine;
pub mod grid;
pub mod motion;
pub mod scheduler;
pub mod scores;
pub mod session;

// Re-export commonly used types
pub use action::Direction;
pub use arbiter::{DirectionArbiter, RequestOutcome, TurnMarkers, TurnState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use engine::{Board, CollisionType, GameEngine, StepResult};
pub use grid::{Cell, Grid, Snake};
pub use motion::{segment_shapes, MotionFrame, MotionInterpolator, Point, SegmentShape};
pub use scheduler::{TickKind, TickScheduler};
pub use scores::{
    HighScoreEntry, JsonFileStore, MemoryStore, RankedTable, ScoreStore, ScoreStoreError,
};
pub use session::{GamePhase, GameSession, GameSnapshot, TickReport};
