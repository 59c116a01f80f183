use super::{
    action::Direction,
    arbiter::TurnMarkers,
    config::GameConfig,
    grid::{Cell, Grid, Snake},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Result of one grid advance
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred; the board is left untouched
    pub collision: Option<CollisionType>,
    /// The snake covers every cell, so no food could be placed
    pub board_full: bool,
}

impl StepResult {
    pub fn terminated(&self) -> bool {
        self.collision.is_some() || self.board_full
    }
}

/// Authoritative grid state of one game
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub snake: Snake,
    pub food: Cell,
    pub score: u32,
    /// Current interval between grid advances
    pub speed: Duration,
    pub steps: u32,
}

/// Owns the grid rules: spawning, moving, eating and collisions
pub struct GameEngine {
    grid: Grid,
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine with reproducible food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            grid: Grid::new(config.grid_size),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh board: single-segment snake on the start cell, food elsewhere
    pub fn spawn_board(&mut self) -> Board {
        let snake = Snake::new(self.config.start_cell);
        let food = self.grid.place_food_avoiding(&snake, &mut self.rng);

        Board {
            snake,
            food,
            score: 0,
            speed: self.config.base_speed,
            steps: 0,
        }
    }

    /// Move the snake one cell in `direction`.
    ///
    /// On collision nothing is mutated. Otherwise the head is pushed, turn
    /// markers follow their segments, and the snake either eats (score,
    /// speed and food update) or drops its tail. Eating the last free cell
    /// ends the game with `board_full` set and the food left under the head.
    pub fn step(
        &mut self,
        board: &mut Board,
        direction: Direction,
        markers: &mut TurnMarkers,
    ) -> StepResult {
        let new_head = board.snake.head().moved_in_direction(direction);

        if let Some(collision) = self.check_collision(board, new_head) {
            return StepResult {
                ate_food: false,
                collision: Some(collision),
                board_full: false,
            };
        }

        board.snake.push_head(new_head);
        markers.shift_for_new_head(board.snake.len());
        board.steps += 1;

        let ate_food = new_head == board.food;
        if ate_food {
            board.score += self.config.food_reward;
            board.speed = self.next_speed(board.speed);
            if self.grid.free_cell_count(&board.snake) == 0 {
                return StepResult {
                    ate_food,
                    collision: None,
                    board_full: true,
                };
            }
            board.food = self.grid.place_food_avoiding(&board.snake, &mut self.rng);
        } else {
            board.snake.pop_tail();
            markers.prune(board.snake.len());
        }

        StepResult {
            ate_food,
            collision: None,
            board_full: false,
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, board: &Board, cell: Cell) -> Option<CollisionType> {
        if self.grid.is_wall(cell) {
            return Some(CollisionType::Wall);
        }

        // The tail has not moved yet, so entering its cell counts
        if self.grid.is_occupied(&board.snake, cell, true) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn next_speed(&self, speed: Duration) -> Duration {
        speed
            .saturating_sub(self.config.speed_decrement)
            .max(self.config.min_speed)
    }
}
