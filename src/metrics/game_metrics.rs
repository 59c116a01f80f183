use std::time::Duration;

/// Statistics for the current process, fed with times from the session clock
pub struct GameMetrics {
    pub started_at: Duration,
    pub elapsed_time: Duration,
    pub best_score: u32,
    pub games_played: u32,
    running: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            best_score: 0,
            games_played: 0,
            running: false,
        }
    }

    /// Refresh the play time; frozen once the game is over
    pub fn update(&mut self, now: Duration) {
        if self.running {
            self.elapsed_time = now.saturating_sub(self.started_at);
        }
    }

    pub fn on_game_start(&mut self, now: Duration) {
        self.started_at = now;
        self.elapsed_time = Duration::ZERO;
        self.running = true;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        if !self.running {
            return;
        }
        self.running = false;
        self.games_played += 1;
        self.best_score = self.best_score.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_best_score_tracking() {
        let mut metrics = GameMetrics::new();

        for score in [10, 5, 15] {
            metrics.on_game_start(Duration::ZERO);
            metrics.on_game_over(score);
        }
        assert_eq!(metrics.best_score, 15);
        assert_eq!(metrics.games_played, 3);
    }

    #[test]
    fn test_game_over_counted_once() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start(Duration::ZERO);
        metrics.on_game_over(20);
        metrics.on_game_over(20);
        assert_eq!(metrics.games_played, 1);
    }

    #[test]
    fn test_elapsed_freezes_after_game_over() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start(Duration::from_secs(10));
        metrics.update(Duration::from_secs(14));
        assert_eq!(metrics.elapsed_time, Duration::from_secs(4));

        metrics.on_game_over(0);
        metrics.update(Duration::from_secs(30));
        assert_eq!(metrics.elapsed_time, Duration::from_secs(4));
    }
}
