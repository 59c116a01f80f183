use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::action::Direction;
use super::grid::Cell;

/// Configuration for the game
///
/// Timing values are (de)serialized as fractional seconds, so a config file
/// reads `"base_speed": 0.3` rather than a `{secs, nanos}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid; valid cells are `1..=grid_size`
    pub grid_size: i32,
    /// Cell the snake starts on
    pub start_cell: Cell,
    /// Heading at the start of a game
    pub start_direction: Direction,
    /// Score awarded per food eaten
    pub food_reward: u32,

    /// Initial interval between grid advances
    #[serde(with = "secs_f64")]
    pub base_speed: Duration,
    /// Fastest allowed interval between grid advances
    #[serde(with = "secs_f64")]
    pub min_speed: Duration,
    /// Amount the interval shrinks per food eaten
    #[serde(with = "secs_f64")]
    pub speed_decrement: Duration,
    /// Period of both the logic check and the render tick
    #[serde(with = "secs_f64")]
    pub refresh_interval: Duration,

    // Turn tuning
    /// Fraction of a tick at either end during which turns apply immediately
    pub response_threshold: f64,
    /// Starting turn progress for an immediate turn in the late window
    pub late_turn_progress: f64,
    /// A turn animation lasts `speed * turn_duration_factor`
    pub turn_duration_factor: f64,
    /// A queued turn fires once `now >= next_move - speed * early_turn_lead`
    pub early_turn_lead: f64,
    /// Starting turn progress for an early-fired queued turn
    pub early_turn_progress: f64,
    /// Elapsed fraction reported before the first grid advance
    pub first_frame_fraction: f64,

    /// Number of entries kept in the high score table
    pub max_high_scores: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            start_cell: Cell::new(10, 10),
            start_direction: Direction::Right,
            food_reward: 10,
            base_speed: Duration::from_millis(300),
            min_speed: Duration::from_millis(150),
            speed_decrement: Duration::from_millis(2),
            refresh_interval: Duration::from_secs_f64(1.0 / 60.0),
            response_threshold: 0.3,
            late_turn_progress: 0.7,
            turn_duration_factor: 0.4,
            early_turn_lead: 0.7,
            early_turn_progress: 0.3,
            first_frame_fraction: 0.01,
            max_high_scores: 10,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(grid_size: i32) -> Self {
        let centre = grid_size / 2;
        Self {
            grid_size,
            start_cell: Cell::new(centre.max(1), centre.max(1)),
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Read a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        config
            .validate()
            .map_err(|msg| anyhow::anyhow!("Invalid config {:?}: {}", path, msg))?;
        Ok(config)
    }

    /// Validate configuration parameters
    ///
    /// Returns `Err(String)` describing the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_size < 2 {
            return Err(format!("grid_size must be at least 2, got {}", self.grid_size));
        }

        let in_range = |v: i32| (1..=self.grid_size).contains(&v);
        if !in_range(self.start_cell.x) || !in_range(self.start_cell.y) {
            return Err(format!(
                "start_cell ({}, {}) lies outside the {}x{} grid",
                self.start_cell.x, self.start_cell.y, self.grid_size, self.grid_size
            ));
        }

        if self.base_speed.is_zero() || self.min_speed.is_zero() {
            return Err("base_speed and min_speed must be positive".to_string());
        }

        if self.min_speed > self.base_speed {
            return Err(format!(
                "min_speed ({:?}) cannot exceed base_speed ({:?})",
                self.min_speed, self.base_speed
            ));
        }

        if self.refresh_interval.is_zero() {
            return Err("refresh_interval must be positive".to_string());
        }

        if !(0.0..=0.5).contains(&self.response_threshold) {
            return Err(format!(
                "response_threshold must be in [0, 0.5], got {}",
                self.response_threshold
            ));
        }

        for (name, value) in [
            ("late_turn_progress", self.late_turn_progress),
            ("early_turn_lead", self.early_turn_lead),
            ("early_turn_progress", self.early_turn_progress),
            ("first_frame_fraction", self.first_frame_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0, 1], got {}", name, value));
            }
        }

        if self.turn_duration_factor.is_nan() || self.turn_duration_factor <= 0.0 {
            return Err(format!(
                "turn_duration_factor must be positive, got {}",
                self.turn_duration_factor
            ));
        }

        if self.max_high_scores == 0 {
            return Err("max_high_scores must be at least 1".to_string());
        }

        Ok(())
    }
}

/// Serde adapter storing a `Duration` as fractional seconds
mod secs_f64 {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
