//! Direction change arbitration.
//!
//! A request either applies at once (when it lands near the start or end of
//! a tick) or is parked in a single-slot queue and animated as a turn that
//! commits a few frames later. Reversals and repeats are dropped without
//! touching any state.

use std::collections::BTreeMap;

use super::action::Direction;
use super::config::GameConfig;

/// What happened to a direction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Reversal or repeat; nothing changed
    Rejected,
    /// Heading changed immediately
    Applied,
    /// Parked in the queue, committed by a later logic check
    Queued,
}

/// Progress of the turn currently being animated
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TurnState {
    pub in_progress: bool,
    /// Fraction of the turn animation completed, in `[0, 1)` while turning
    pub progress: f64,
    /// Heading before the turn started
    pub from: Option<Direction>,
    /// Heading the turn is heading into
    pub to: Option<Direction>,
}

impl TurnState {
    fn begin(from: Direction, to: Direction, progress: f64) -> Self {
        Self {
            in_progress: true,
            progress,
            from: Some(from),
            to: Some(to),
        }
    }
}

/// Segment index -> direction for segments rendered with a bend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnMarkers {
    marks: BTreeMap<usize, Direction>,
}

impl TurnMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, index: usize, direction: Direction) {
        self.marks.insert(index, direction);
    }

    pub fn get(&self, index: usize) -> Option<Direction> {
        self.marks.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Direction)> + '_ {
        self.marks.iter().map(|(i, d)| (*i, *d))
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    /// A new head was inserted: every mark moves one segment back.
    /// `snake_len` is the length after insertion.
    pub fn shift_for_new_head(&mut self, snake_len: usize) {
        self.marks = std::mem::take(&mut self.marks)
            .into_iter()
            .map(|(i, d)| (i + 1, d))
            .filter(|(i, _)| *i < snake_len)
            .collect();
    }

    /// Drop marks that no longer point at a segment
    pub fn prune(&mut self, snake_len: usize) {
        self.marks.retain(|i, _| *i < snake_len);
    }
}

/// Owns the heading, the one-slot turn queue, the turn animation and the
/// per-segment turn markers.
#[derive(Debug, Clone)]
pub struct DirectionArbiter {
    current: Direction,
    queued: Option<Direction>,
    turn: TurnState,
    markers: TurnMarkers,
    response_threshold: f64,
    late_turn_progress: f64,
    early_turn_progress: f64,
}

impl DirectionArbiter {
    pub fn new(initial: Direction, config: &GameConfig) -> Self {
        Self {
            current: initial,
            queued: None,
            turn: TurnState::default(),
            markers: TurnMarkers::new(),
            response_threshold: config.response_threshold,
            late_turn_progress: config.late_turn_progress,
            early_turn_progress: config.early_turn_progress,
        }
    }

    /// Forget every pending turn and head in `initial`
    pub fn reset(&mut self, initial: Direction) {
        self.current = initial;
        self.queued = None;
        self.turn = TurnState::default();
        self.markers.clear();
    }

    pub fn current(&self) -> Direction {
        self.current
    }

    pub fn queued(&self) -> Option<Direction> {
        self.queued
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn markers(&self) -> &TurnMarkers {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut TurnMarkers {
        &mut self.markers
    }

    /// Arbitrate a request that arrives `elapsed_fraction` of the way
    /// through the current tick.
    pub fn request(&mut self, requested: Direction, elapsed_fraction: f64) -> RequestOutcome {
        if requested == self.current.opposite()
            || requested == self.current
            || self.queued == Some(requested)
        {
            return RequestOutcome::Rejected;
        }

        let fraction = elapsed_fraction.clamp(0.0, 1.0);
        let immediate = fraction < self.response_threshold
            || fraction > 1.0 - self.response_threshold;

        if immediate {
            self.queued = None;
            let progress = if fraction < 0.5 {
                0.0
            } else {
                self.late_turn_progress
            };
            self.turn = TurnState::begin(self.current, requested, progress);
            self.current = requested;
            self.markers.mark(0, requested);
            return RequestOutcome::Applied;
        }

        if !self.turn.in_progress && self.queued.is_none() {
            self.turn = TurnState::begin(self.current, requested, 0.0);
        }
        self.queued = Some(requested);
        self.markers.mark(0, requested);
        RequestOutcome::Queued
    }

    /// Advance an in-progress turn by `step`. Returns true when the turn
    /// finished on this call, committing its target heading.
    pub fn progress_turn(&mut self, step: f64) -> bool {
        if !self.turn.in_progress {
            return false;
        }

        self.turn.progress += step;
        if self.turn.progress < 1.0 {
            return false;
        }

        if let Some(target) = self.turn.to {
            self.current = target;
        }
        self.turn.in_progress = false;
        self.turn.progress = 0.0;
        self.queued = None;
        true
    }

    /// Apply the queued direction ahead of the tick boundary. The queue is
    /// emptied when the resulting turn completes.
    pub fn fire_queued(&mut self) -> Option<Direction> {
        let next = self.queued?;
        if self.turn.in_progress {
            return None;
        }
        self.turn = TurnState::begin(self.current, next, self.early_turn_progress);
        self.current = next;
        Some(next)
    }
}
