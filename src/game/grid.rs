//! Grid model: cells, the snake body and board queries.
//!
//! Cells use 1-based coordinates, so a grid of size `n` spans `1..=n` on
//! both axes. Everything here is plain data plus read-only queries; the
//! engine is the only thing that mutates a snake.

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::action::Direction;

/// Random draws attempted before falling back to enumerating free cells
const FOOD_SAMPLE_ATTEMPTS: usize = 64;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move cell by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move cell one step in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Direction of a neighbouring cell, if `other` is orthogonally adjacent
    pub fn direction_to(&self, other: Cell) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|dir| self.moved_in_direction(*dir) == other)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    body: Vec<Cell>,
}

impl Snake {
    /// Create a single-segment snake
    pub fn new(head: Cell) -> Self {
        Self { body: vec![head] }
    }

    /// Create a snake from explicit segments, head first.
    ///
    /// Panics if `body` is empty; a snake always has a head.
    pub fn from_cells(body: Vec<Cell>) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Self { body }
    }

    /// Get the head cell
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Get the tail cell (last segment)
    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.body
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Cell] {
        &self.body[1..]
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Check if cell collides with snake body (excluding head)
    pub fn collides_with_body(&self, cell: Cell) -> bool {
        self.body_segments().contains(&cell)
    }

    pub(crate) fn push_head(&mut self, cell: Cell) {
        self.body.insert(0, cell);
    }

    /// Drop the tail segment. The head is never removed.
    pub(crate) fn pop_tail(&mut self) -> Option<Cell> {
        if self.body.len() > 1 {
            self.body.pop()
        } else {
            None
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// True when no two segments share a cell
    pub fn is_self_disjoint(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.body.len());
        self.body.iter().all(|cell| seen.insert(*cell))
    }
}

/// Square board bounds and placement queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: i32,
}

impl Grid {
    pub fn new(size: i32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        (self.size.max(0) as usize).pow(2)
    }

    /// True if the cell lies outside `[1, size]²`
    pub fn is_wall(&self, cell: Cell) -> bool {
        !(1..=self.size).contains(&cell.x) || !(1..=self.size).contains(&cell.y)
    }

    /// Whether `cell` is covered by the snake, optionally ignoring the head
    pub fn is_occupied(&self, snake: &Snake, cell: Cell, excluding_head: bool) -> bool {
        if excluding_head {
            snake.collides_with_body(cell)
        } else {
            snake.contains(cell)
        }
    }

    /// Every in-bounds cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..=self.size).flat_map(move |y| (1..=self.size).map(move |x| Cell::new(x, y)))
    }

    pub fn free_cell_count(&self, snake: &Snake) -> usize {
        let on_board = snake.cells().iter().filter(|c| !self.is_wall(**c)).count();
        self.cell_count().saturating_sub(on_board)
    }

    /// Pick a uniformly random cell not covered by the snake.
    ///
    /// Panics when the board is full: there is nowhere to put food, which
    /// means the grid was configured too small for the game being played.
    pub fn place_food_avoiding<R: Rng>(&self, snake: &Snake, rng: &mut R) -> Cell {
        assert!(
            self.free_cell_count(snake) > 0,
            "no free cell left for food on a {}x{} grid",
            self.size,
            self.size
        );

        for _ in 0..FOOD_SAMPLE_ATTEMPTS {
            let cell = Cell::new(rng.gen_range(1..=self.size), rng.gen_range(1..=self.size));
            if !snake.contains(cell) {
                return cell;
            }
        }

        // Crowded board: choose among the remaining cells directly
        self.cells()
            .filter(|cell| !snake.contains(*cell))
            .choose(rng)
            .unwrap_or(Cell::new(1, 1))
    }
}
