use proptest::prelude::*;
use smooth_snake::game::{
    Cell, Direction, GameConfig, GamePhase, GameSession, ManualClock, MemoryStore, MotionFrame,
    MotionInterpolator, Point, Snake, TurnMarkers, TurnState,
};
use std::time::Duration;

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_random_play_keeps_grid_invariants(
        seed in any::<u64>(),
        moves in prop::collection::vec((direction(), 1u32..40), 1..40),
    ) {
        let clock = ManualClock::new();
        let config = GameConfig::small();
        let mut session =
            GameSession::with_seed(config.clone(), clock.clone(), MemoryStore::new(), seed)
                .unwrap();
        session.start();

        'play: for (dir, ticks) in moves {
            session.request_direction(dir);

            for _ in 0..ticks {
                let before = session.board().clone();
                clock.advance(config.refresh_interval);
                session.run_due_ticks();

                let board = session.board();
                let snake = &board.snake;
                let growth = snake.len() as i64 - before.snake.len() as i64;
                prop_assert!(growth == 0 || growth == 1);
                prop_assert!(snake.is_self_disjoint());
                prop_assert!(snake
                    .cells()
                    .iter()
                    .all(|c| (1..=config.grid_size).contains(&c.x)
                        && (1..=config.grid_size).contains(&c.y)));
                prop_assert!(board.score >= before.score);
                prop_assert!(board.speed <= before.speed);
                prop_assert!(board.speed >= config.min_speed);
                prop_assert_eq!(session.render_positions().len(), snake.len());

                if session.phase() != GamePhase::Playing {
                    prop_assert_eq!(session.phase(), GamePhase::GameOver);
                    prop_assert_eq!(snake, &before.snake);
                    break 'play;
                }
                prop_assert!(!snake.contains(board.food));
            }
        }
    }

    #[test]
    fn test_positions_snap_to_cells_at_tick_edges(
        heading in direction(),
        len in 1usize..6,
        marked in prop::collection::vec((0usize..6, direction()), 0..4),
        turning in any::<bool>(),
        edge in prop::sample::select(vec![0.0, 1.0]),
    ) {
        // Straight snake trailing behind a head in the middle of the grid
        let tail_dir = heading.opposite();
        let mut cells = vec![Cell::new(10, 10)];
        for i in 1..len {
            cells.push(cells[i - 1].moved_in_direction(tail_dir));
        }
        let snake = Snake::from_cells(cells);

        let mut markers = TurnMarkers::new();
        for (index, dir) in marked {
            markers.mark(index, dir);
        }
        markers.prune(snake.len());

        let turn = if turning {
            TurnState {
                in_progress: true,
                progress: 0.4,
                from: Some(match heading {
                    Direction::Up | Direction::Down => Direction::Left,
                    Direction::Left | Direction::Right => Direction::Up,
                }),
                to: Some(heading),
            }
        } else {
            TurnState::default()
        };

        let frame = MotionFrame {
            snake: &snake,
            direction: heading,
            turn: &turn,
            markers: &markers,
            elapsed_fraction: edge,
            opening: false,
        };
        let positions = MotionInterpolator::new().positions(&frame);

        let expected: Vec<Point> = snake.cells().iter().map(|c| Point::from(*c)).collect();
        prop_assert_eq!(positions.len(), expected.len());
        for (got, want) in positions.iter().zip(expected.iter()) {
            prop_assert!((got.x - want.x).abs() < 1e-9 && (got.y - want.y).abs() < 1e-9,
                "{:?} != {:?}", got, want);
        }
    }
}
