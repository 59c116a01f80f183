use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points, Rectangle},
        Block, BorderType, Borders, Paragraph,
    },
    Frame,
};

use crate::game::{
    segment_shapes, Clock, GamePhase, GameSession, HighScoreEntry, Point, ScoreStore,
    SegmentShape,
};
use crate::metrics::GameMetrics;

/// Side of the square drawn for each segment, in grid units
const SEGMENT_SIZE: f64 = 0.8;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<C: Clock, S: ScoreStore>(
        &self,
        frame: &mut Frame,
        session: &GameSession<C, S>,
        metrics: &GameMetrics,
        name_entry: Option<&str>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(session, metrics);
        frame.render_widget(stats, chunks[0]);

        // Center the game area horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match session.phase() {
            GamePhase::Ready => frame.render_widget(self.render_menu(), game_area),
            GamePhase::Playing => self.render_board(frame, game_area, session),
            GamePhase::GameOver => {
                frame.render_widget(self.render_game_over(session, name_entry), game_area)
            }
            GamePhase::HighScores => {
                frame.render_widget(self.render_high_scores(session.high_scores()), game_area)
            }
        }

        let controls = self.render_controls(session.phase(), name_entry.is_some());
        frame.render_widget(controls, chunks[2]);
    }

    fn render_board<C: Clock, S: ScoreStore>(
        &self,
        frame: &mut Frame,
        area: Rect,
        session: &GameSession<C, S>,
    ) {
        let size = f64::from(session.config().grid_size);
        let state = session.current_state();
        let positions = session.render_positions();
        let shapes = segment_shapes(&session.board().snake);
        // canvas y grows upwards, grid y grows downwards
        let flip = |p: Point| (p.x, size + 1.0 - p.y);
        let food = [flip(Point::from(state.food))];

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .marker(Marker::Braille)
            .x_bounds([0.5, size + 0.5])
            .y_bounds([0.5, size + 0.5])
            .paint(move |ctx| {
                ctx.draw(&Points {
                    coords: &food,
                    color: Color::Red,
                });

                for (pos, shape) in positions.iter().zip(shapes.iter()).rev() {
                    let (x, y) = flip(*pos);
                    ctx.draw(&Rectangle {
                        x: x - SEGMENT_SIZE / 2.0,
                        y: y - SEGMENT_SIZE / 2.0,
                        width: SEGMENT_SIZE,
                        height: SEGMENT_SIZE,
                        color: segment_color(shape),
                    });
                }
            });

        frame.render_widget(canvas, area);
    }

    fn render_stats<C: Clock, S: ScoreStore>(
        &self,
        session: &GameSession<C, S>,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let state = session.current_state();
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Yellow));
        let value = |text: String| Span::styled(text, Style::default().fg(Color::White));

        let text = vec![Line::from(vec![
            label("Score: "),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            label("Length: "),
            value(state.snake.len().to_string()),
            Span::raw("    "),
            label("Tick: "),
            value(format!("{}ms", state.speed.as_millis())),
            Span::raw("    "),
            label("Time: "),
            value(metrics.format_time()),
            Span::raw("    "),
            label("Best: "),
            value(metrics.best_score.to_string()),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_menu(&self) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "SMOOTH SNAKE",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Space", key_style(Color::Green)),
                Span::styled(" to play    ", Style::default().fg(Color::Gray)),
                Span::styled("H", key_style(Color::Cyan)),
                Span::styled(" high scores    ", Style::default().fg(Color::Gray)),
                Span::styled("Q", key_style(Color::Red)),
                Span::styled(" quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    }

    fn render_game_over<C: Clock, S: ScoreStore>(
        &self,
        session: &GameSession<C, S>,
        name_entry: Option<&str>,
    ) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    session.board().score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];

        match name_entry {
            Some(name) => text.push(Line::from(vec![
                Span::styled("Name: ", Style::default().fg(Color::Yellow)),
                Span::styled(format!("{}_", name), Style::default().fg(Color::White)),
            ])),
            None => text.push(Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("R", key_style(Color::Green)),
                Span::styled(" to restart, ", Style::default().fg(Color::Gray)),
                Span::styled("N", key_style(Color::Cyan)),
                Span::styled(" to save your score or ", Style::default().fg(Color::Gray)),
                Span::styled("Q", key_style(Color::Red)),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ])),
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_high_scores<'a>(&self, entries: &'a [HighScoreEntry]) -> Paragraph<'a> {
        let mut text = vec![Line::from("")];
        if entries.is_empty() {
            text.push(Line::from(Span::styled(
                "No scores yet",
                Style::default().fg(Color::Gray),
            )));
        }

        for (rank, entry) in entries.iter().enumerate() {
            let rank_style = match rank {
                0 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                1 | 2 => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(Color::Gray),
            };
            text.push(Line::from(vec![
                Span::styled(format!("{:>2}. ", rank + 1), rank_style),
                Span::styled(format!("{:<16}", entry.name), Style::default().fg(Color::White)),
                Span::styled(format!("{:>6}", entry.score), Style::default().fg(Color::Green)),
                Span::styled(
                    format!("   {}", entry.timestamp.format("%Y-%m-%d")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" High Scores "),
        )
    }

    fn render_controls(&self, phase: GamePhase, typing: bool) -> Paragraph<'_> {
        let line = if typing {
            Line::from(vec![
                Span::styled("Enter", Style::default().fg(Color::Cyan)),
                Span::raw(" to save | "),
                Span::styled("Esc", Style::default().fg(Color::Red)),
                Span::raw(" to cancel"),
            ])
        } else if phase == GamePhase::Playing {
            Line::from(vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
                Span::styled("Esc", Style::default().fg(Color::Yellow)),
                Span::raw(" menu | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ])
        } else {
            Line::from(vec![
                Span::styled("Esc", Style::default().fg(Color::Yellow)),
                Span::raw(" menu | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ])
        };

        Paragraph::new(vec![line]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn key_style(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn segment_color(shape: &SegmentShape) -> Color {
    match shape {
        SegmentShape::Head { .. } => Color::Cyan,
        SegmentShape::Turn { .. } => Color::LightGreen,
        SegmentShape::Body { .. } => Color::Green,
        SegmentShape::Tail { .. } => Color::DarkGray,
    }
}
