use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::cell::Cell as FlagCell;
use std::io::{stderr, Stderr};
use std::rc::Rc;
use std::time::Duration;
use tokio::time::sleep;

use crate::game::{Clock, GameConfig, GamePhase, GameSession, ScoreStore, SystemClock};
use crate::input::{InputHandler, KeyAction, NameInput};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// How long to wait for input when no tick is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Longest name accepted for the score table
const MAX_NAME_LEN: usize = 16;

pub struct HumanMode<S: ScoreStore> {
    session: GameSession<SystemClock, S>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Name being typed after a game over
    name_entry: Option<String>,
    /// Set by the session observer whenever game state changes
    dirty: Rc<FlagCell<bool>>,
}

impl<S: ScoreStore> HumanMode<S> {
    pub fn new(config: GameConfig, store: S) -> Result<Self> {
        let session = GameSession::new(config, SystemClock::new(), store)?;
        Ok(Self::with_session(session))
    }

    fn with_session(mut session: GameSession<SystemClock, S>) -> Self {
        let dirty = Rc::new(FlagCell::new(true));
        let flag = Rc::clone(&dirty);
        session.set_state_observer(move |_| flag.set(true));

        Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            name_entry: None,
            dirty,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        loop {
            let wait = self.session.next_tick_in().unwrap_or(IDLE_POLL);

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Next logic or render tick
                _ = sleep(wait) => {}

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            let report = self.session.run_due_ticks();
            self.track_metrics();

            if report.render > 0 || self.dirty.replace(false) {
                terminal
                    .draw(|frame| {
                        self.renderer.render(
                            frame,
                            &self.session,
                            &self.metrics,
                            self.name_entry.as_deref(),
                        );
                    })
                    .context("Failed to draw frame")?;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Resize(..) => self.dirty.set(true),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.name_entry.is_some() {
            self.handle_name_key(key);
            return;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Turn(direction) => {
                self.session.request_direction(direction);
            }
            KeyAction::Start => {
                if self.session.phase() != GamePhase::Playing {
                    self.session.start();
                    self.metrics.on_game_start(self.session.clock().now());
                }
            }
            KeyAction::ShowHighScores => {
                if self.session.phase() != GamePhase::Playing {
                    self.session.show_high_scores();
                }
            }
            KeyAction::EnterName => {
                if self.session.phase() == GamePhase::GameOver {
                    self.name_entry = Some(String::new());
                    self.dirty.set(true);
                }
            }
            KeyAction::Menu => self.session.return_to_menu(),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) {
        let Some(name) = self.name_entry.as_mut() else {
            return;
        };

        match self.input_handler.handle_name_key(key) {
            NameInput::Push(c) if name.chars().count() < MAX_NAME_LEN => name.push(c),
            NameInput::Push(_) | NameInput::Ignore => {}
            NameInput::Backspace => {
                name.pop();
            }
            NameInput::Submit => {
                let name = self.name_entry.take().unwrap_or_default();
                self.session.record_score(&name);
                self.session.show_high_scores();
            }
            NameInput::Cancel => self.name_entry = None,
        }
        self.dirty.set(true);
    }

    fn track_metrics(&mut self) {
        self.metrics.update(self.session.clock().now());
        if self.session.phase() == GamePhase::GameOver {
            self.metrics.on_game_over(self.session.board().score);
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
