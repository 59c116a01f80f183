//! Tick scheduling.
//!
//! The logic check and the render refresh are two periodic processes, but
//! they are modelled as deadlines on one timeline: the driver asks for the
//! next due tick, runs it, and asks again. Nothing fires once the scheduler
//! is stopped, and missed periods are not replayed.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Turn progress, early turns and grid advances
    Logic,
    /// Interpolated positions for display
    Render,
}

#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    next_logic: Option<Duration>,
    next_render: Option<Duration>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_logic: None,
            next_render: None,
        }
    }

    /// (Re)start both processes; the first of each is due one period from now
    pub fn start(&mut self, now: Duration) {
        self.next_logic = Some(now + self.period);
        self.next_render = Some(now + self.period);
    }

    /// Cancel both processes. Safe to call when already stopped.
    pub fn stop(&mut self) {
        self.next_logic = None;
        self.next_render = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_logic.is_some() && self.next_render.is_some()
    }

    /// Earliest pending deadline, if running
    pub fn next_deadline(&self) -> Option<Duration> {
        Some(self.next_logic?.min(self.next_render?))
    }

    /// Time left until the next tick is due, zero if one is overdue
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.next_deadline().map(|at| at.saturating_sub(now))
    }

    /// Take the earliest tick due at `now`, rescheduling its process.
    /// Logic wins ties so a frame always sees the latest grid state.
    pub fn pop_due(&mut self, now: Duration) -> Option<TickKind> {
        let logic = self.next_logic?;
        let render = self.next_render?;

        let (kind, due) = if logic <= render {
            (TickKind::Logic, logic)
        } else {
            (TickKind::Render, render)
        };
        if due > now {
            return None;
        }

        let mut next = due + self.period;
        if next <= now {
            next = now + self.period;
        }
        match kind {
            TickKind::Logic => self.next_logic = Some(next),
            TickKind::Render => self.next_render = Some(next),
        }
        Some(kind)
    }
}

/// Timing of grid advances, independent of the refresh period
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveTimer {
    pub last_move: Duration,
    pub next_move: Duration,
    /// False until the first advance of a game
    pub has_moved: bool,
}

impl MoveTimer {
    pub fn start(&mut self, now: Duration, speed: Duration) {
        self.last_move = now;
        self.next_move = now + speed;
        self.has_moved = false;
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next_move
    }

    pub fn record_move(&mut self, now: Duration, speed: Duration) {
        self.last_move = now;
        self.next_move = now + speed;
        self.has_moved = true;
    }

    /// Whether `now` is within `speed * lead` of the next advance
    pub fn early_turn_open(&self, now: Duration, speed: Duration, lead: f64) -> bool {
        now + speed.mul_f64(lead) >= self.next_move
    }

    pub fn elapsed_fraction(&self, now: Duration, speed: Duration) -> f64 {
        elapsed_fraction(now, self.last_move, speed)
    }
}

/// `(now - since) / interval`, clamped to `[0, 1]`
pub fn elapsed_fraction(now: Duration, since: Duration, interval: Duration) -> f64 {
    if interval.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(since).as_secs_f64();
    (elapsed / interval.as_secs_f64()).clamp(0.0, 1.0)
}

/// Turn progress gained per logic check
pub fn turn_step(refresh: Duration, speed: Duration, turn_duration_factor: f64) -> f64 {
    let turn_secs = speed.as_secs_f64() * turn_duration_factor;
    if turn_secs <= 0.0 {
        return 1.0;
    }
    refresh.as_secs_f64() / turn_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_nothing_fires_before_start() {
        let mut sched = TickScheduler::new(ms(10));
        assert!(!sched.is_running());
        assert_eq!(sched.pop_due(ms(1_000)), None);
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn test_logic_then_render_each_period() {
        let mut sched = TickScheduler::new(ms(10));
        sched.start(ms(0));

        assert_eq!(sched.pop_due(ms(5)), None);
        assert_eq!(sched.pop_due(ms(10)), Some(TickKind::Logic));
        assert_eq!(sched.pop_due(ms(10)), Some(TickKind::Render));
        assert_eq!(sched.pop_due(ms(10)), None);
        assert_eq!(sched.next_deadline(), Some(ms(20)));
    }

    #[test]
    fn test_no_catch_up_after_stall() {
        let mut sched = TickScheduler::new(ms(10));
        sched.start(ms(0));

        assert_eq!(sched.pop_due(ms(95)), Some(TickKind::Logic));
        assert_eq!(sched.pop_due(ms(95)), Some(TickKind::Render));
        assert_eq!(sched.pop_due(ms(95)), None);
        assert_eq!(sched.next_deadline(), Some(ms(105)));
    }

    #[test]
    fn test_stop_is_idempotent_and_final() {
        let mut sched = TickScheduler::new(ms(10));
        sched.start(ms(0));
        sched.stop();
        sched.stop();

        assert!(!sched.is_running());
        assert_eq!(sched.pop_due(ms(50)), None);
        assert_eq!(sched.time_until_next(ms(50)), None);
    }

    #[test]
    fn test_time_until_next_saturates() {
        let mut sched = TickScheduler::new(ms(10));
        sched.start(ms(0));
        assert_eq!(sched.time_until_next(ms(4)), Some(ms(6)));
        assert_eq!(sched.time_until_next(ms(40)), Some(Duration::ZERO));
    }

    #[test]
    fn test_elapsed_fraction_clamps() {
        assert_eq!(elapsed_fraction(ms(0), ms(10), ms(100)), 0.0);
        assert_eq!(elapsed_fraction(ms(60), ms(10), ms(100)), 0.5);
        assert_eq!(elapsed_fraction(ms(500), ms(10), ms(100)), 1.0);
        assert_eq!(elapsed_fraction(ms(5), ms(0), Duration::ZERO), 1.0);
    }

    #[test]
    fn test_move_timer_windows() {
        let mut timer = MoveTimer::default();
        timer.start(ms(0), ms(300));

        assert!(!timer.is_due(ms(299)));
        assert!(timer.is_due(ms(300)));
        assert!(!timer.early_turn_open(ms(89), ms(300), 0.7));
        assert!(timer.early_turn_open(ms(91), ms(300), 0.7));

        timer.record_move(ms(300), ms(290));
        assert!(timer.has_moved);
        assert_eq!(timer.next_move, ms(590));
    }

    #[test]
    fn test_turn_step_matches_refresh_over_turn_length() {
        let step = turn_step(ms(10), ms(250), 0.4);
        assert!((step - 0.1).abs() < 1e-12);
    }
}
