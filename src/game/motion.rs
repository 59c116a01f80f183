//! Display positions between grid advances.
//!
//! The grid only changes once per tick. Renderers ask for continuous
//! positions instead: the head glides toward its next cell (bending through
//! turns with a cubic ease), each body segment glides toward the cell of the
//! segment in front of it, and marked segments bow outward while they turn.

use serde::Serialize;
use std::f64::consts::PI;

use super::action::Direction;
use super::arbiter::{TurnMarkers, TurnState};
use super::grid::{Cell, Snake};

/// Continuous position in grid units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, (dx, dy): (f64, f64), scale: f64) -> Self {
        Self::new(self.x + dx * scale, self.y + dy * scale)
    }

    /// Linear interpolation toward `to`
    pub fn lerp(self, to: Point, t: f64) -> Self {
        Self::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

impl From<Cell> for Point {
    fn from(cell: Cell) -> Self {
        Self::new(f64::from(cell.x), f64::from(cell.y))
    }
}

/// Cubic ease-in-out on `[0, 1]`
pub fn ease_in_out_cubic(w: f64) -> f64 {
    if w < 0.5 {
        4.0 * w * w * w
    } else {
        1.0 - (-2.0 * w + 2.0).powi(3) / 2.0
    }
}

/// Everything the interpolator reads for one frame
#[derive(Debug, Clone, Copy)]
pub struct MotionFrame<'a> {
    pub snake: &'a Snake,
    pub direction: Direction,
    pub turn: &'a TurnState,
    pub markers: &'a TurnMarkers,
    /// Fraction of the current tick elapsed, in `[0, 1]`
    pub elapsed_fraction: f64,
    /// True while playing and before the first grid advance
    pub opening: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionInterpolator {
    /// Sideways bow applied to a turning segment at mid-tick
    pub curve_offset: f64,
    /// Largest fraction used for the opening glide of a lone head
    pub opening_cap: f64,
    /// Scale applied to the opening glide
    pub opening_scale: f64,
}

impl Default for MotionInterpolator {
    fn default() -> Self {
        Self {
            curve_offset: 0.2,
            opening_cap: 0.1,
            opening_scale: 0.3,
        }
    }
}

impl MotionInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// One display position per snake segment, head first
    pub fn positions(&self, frame: &MotionFrame<'_>) -> Vec<Point> {
        let cells = frame.snake.cells();
        let t = frame.elapsed_fraction.clamp(0.0, 1.0);

        if frame.opening && cells.len() == 1 {
            let step = t.min(self.opening_cap) * self.opening_scale;
            let head = Point::from(cells[0]).offset(frame.direction.unit_vector(), step);
            return vec![head];
        }

        if t >= 1.0 {
            return snap(frame.snake);
        }

        let mut out = Vec::with_capacity(cells.len());
        out.push(self.head_position(frame, t));

        let curve = (PI * t).sin();
        for i in 1..cells.len() {
            let mut pos = Point::from(cells[i]).lerp(Point::from(cells[i - 1]), t);
            if let Some(turn_dir) = frame.markers.get(i) {
                pos = pos.offset(turn_dir.unit_vector(), self.curve_offset * curve);
            }
            out.push(pos);
        }
        out
    }

    fn head_position(&self, frame: &MotionFrame<'_>, t: f64) -> Point {
        let head = Point::from(frame.snake.head());
        let heading = match (frame.turn.in_progress, frame.turn.from, frame.turn.to) {
            (true, Some(from), Some(to)) => {
                let w = ease_in_out_cubic(frame.turn.progress.clamp(0.0, 1.0));
                let (fx, fy) = from.unit_vector();
                let (tx, ty) = to.unit_vector();
                (fx * (1.0 - w) + tx * w, fy * (1.0 - w) + ty * w)
            }
            _ => frame.direction.unit_vector(),
        };
        head.lerp(head.offset(heading, 1.0), t)
    }
}

/// Positions exactly on the grid cells
pub fn snap(snake: &Snake) -> Vec<Point> {
    snake.cells().iter().copied().map(Point::from).collect()
}

/// How a segment should be drawn, from its neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    /// Facing is unknown for a lone head
    Head { facing: Option<Direction> },
    /// Straight piece; `toward_head` points at the previous segment
    Body { toward_head: Direction },
    /// Corner piece joining two perpendicular neighbours
    Turn {
        toward_head: Direction,
        toward_tail: Direction,
    },
    Tail { toward_head: Direction },
}

/// Classify each segment. Gaps between non-adjacent cells fall back to a
/// plain body piece heading right.
pub fn segment_shapes(snake: &Snake) -> Vec<SegmentShape> {
    let cells = snake.cells();
    if cells.len() == 1 {
        return vec![SegmentShape::Head { facing: None }];
    }

    let last = cells.len() - 1;
    (0..cells.len())
        .map(|i| {
            if i == 0 {
                return SegmentShape::Head {
                    facing: cells[1].direction_to(cells[0]),
                };
            }

            let toward_head = cells[i].direction_to(cells[i - 1]).unwrap_or(Direction::Right);
            if i == last {
                return SegmentShape::Tail { toward_head };
            }

            match cells[i].direction_to(cells[i + 1]) {
                Some(toward_tail) if toward_tail != toward_head.opposite() => SegmentShape::Turn {
                    toward_head,
                    toward_tail,
                },
                _ => SegmentShape::Body { toward_head },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    fn three_up() -> Snake {
        Snake::from_cells(vec![Cell::new(5, 5), Cell::new(5, 6), Cell::new(5, 7)])
    }

    fn frame<'a>(
        snake: &'a Snake,
        turn: &'a TurnState,
        markers: &'a TurnMarkers,
        direction: Direction,
        t: f64,
    ) -> MotionFrame<'a> {
        MotionFrame {
            snake,
            direction,
            turn,
            markers,
            elapsed_fraction: t,
            opening: false,
        }
    }

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < EPS);
        assert!((ease_in_out_cubic(0.25) - 0.0625).abs() < EPS);
    }

    #[test]
    fn test_boundaries_equal_grid_cells() {
        let snake = three_up();
        let turn = TurnState::default();
        let mut markers = TurnMarkers::new();
        markers.mark(1, Direction::Left);
        let interp = MotionInterpolator::new();

        for t in [0.0, 1.0] {
            let positions = interp.positions(&frame(&snake, &turn, &markers, Direction::Up, t));
            assert_eq!(positions, snap(&snake));
        }
    }

    #[test]
    fn test_straight_motion_mid_tick() {
        let snake = three_up();
        let turn = TurnState::default();
        let markers = TurnMarkers::new();

        let positions = MotionInterpolator::new()
            .positions(&frame(&snake, &turn, &markers, Direction::Up, 0.5));

        assert!(close(positions[0], Point::new(5.0, 4.5)));
        assert!(close(positions[1], Point::new(5.0, 5.5)));
        assert!(close(positions[2], Point::new(5.0, 6.5)));
    }

    #[test]
    fn test_turning_head_blends_directions() {
        let snake = three_up();
        let turn = TurnState {
            in_progress: true,
            progress: 0.5,
            from: Some(Direction::Up),
            to: Some(Direction::Left),
        };
        let markers = TurnMarkers::new();

        let positions = MotionInterpolator::new()
            .positions(&frame(&snake, &turn, &markers, Direction::Up, 1.0 - EPS));
        // halfway through the ease both headings weigh the same
        assert!((positions[0].x - 4.5).abs() < 1e-6);
        assert!((positions[0].y - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_marked_segment_bows_outward() {
        let snake = three_up();
        let turn = TurnState::default();
        let mut markers = TurnMarkers::new();
        markers.mark(1, Direction::Left);

        let positions = MotionInterpolator::new()
            .positions(&frame(&snake, &turn, &markers, Direction::Up, 0.5));

        assert!(close(positions[1], Point::new(4.8, 5.5)));
        assert!(close(positions[2], Point::new(5.0, 6.5)));
    }

    #[test]
    fn test_opening_glide_is_small() {
        let snake = Snake::new(Cell::new(10, 10));
        let turn = TurnState::default();
        let markers = TurnMarkers::new();
        let mut f = frame(&snake, &turn, &markers, Direction::Right, 0.8);
        f.opening = true;

        let positions = MotionInterpolator::new().positions(&f);
        assert_eq!(positions.len(), 1);
        assert!(close(positions[0], Point::new(10.03, 10.0)));
    }

    #[test]
    fn test_segment_shapes() {
        // head at (4,5) heading left, corner at (5,5), tail below
        let snake = Snake::from_cells(vec![
            Cell::new(4, 5),
            Cell::new(5, 5),
            Cell::new(5, 6),
            Cell::new(5, 7),
        ]);
        let shapes = segment_shapes(&snake);

        assert_eq!(shapes[0], SegmentShape::Head { facing: Some(Direction::Left) });
        assert_eq!(
            shapes[1],
            SegmentShape::Turn {
                toward_head: Direction::Left,
                toward_tail: Direction::Down,
            }
        );
        assert_eq!(shapes[2], SegmentShape::Body { toward_head: Direction::Up });
        assert_eq!(shapes[3], SegmentShape::Tail { toward_head: Direction::Up });

        let lone = Snake::new(Cell::new(1, 1));
        assert_eq!(segment_shapes(&lone), vec![SegmentShape::Head { facing: None }]);
    }
}
