//! Smooth Snake - a grid Snake with frame-rate independent motion
//!
//! This library provides:
//! - Core game logic: grid, direction arbitration, tick scheduling,
//!   motion interpolation and the game session (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering of interpolated positions (render module)
//! - Per-process play statistics (metrics module)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
