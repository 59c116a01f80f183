use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Turn(Direction),
    /// Start a game, or restart after game over
    Start,
    ShowHighScores,
    /// Begin typing a name for the score table
    EnterName,
    Menu,
    Quit,
    None,
}

/// Key input while the player is typing a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameInput {
    Push(char),
    Backspace,
    Submit,
    Cancel,
    Ignore,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => KeyAction::Turn(Direction::Up),
            KeyCode::Down => KeyAction::Turn(Direction::Down),
            KeyCode::Left => KeyAction::Turn(Direction::Left),
            KeyCode::Right => KeyAction::Turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Turn(Direction::Right),

            // Controls
            KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Start,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Start,
            KeyCode::Char('h') | KeyCode::Char('H') => KeyAction::ShowHighScores,
            KeyCode::Char('n') | KeyCode::Char('N') => KeyAction::EnterName,
            KeyCode::Esc => KeyAction::Menu,
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }

    pub fn handle_name_key(&self, key: KeyEvent) -> NameInput {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return NameInput::Ignore;
        }

        match key.code {
            KeyCode::Enter => NameInput::Submit,
            KeyCode::Esc => NameInput::Cancel,
            KeyCode::Backspace => NameInput::Backspace,
            KeyCode::Char(c) if !c.is_control() => NameInput::Push(c),
            _ => NameInput::Ignore,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key_event(key(KeyCode::Up)), KeyAction::Turn(Direction::Up));
        assert_eq!(handler.handle_key_event(key(KeyCode::Down)), KeyAction::Turn(Direction::Down));
        assert_eq!(handler.handle_key_event(key(KeyCode::Left)), KeyAction::Turn(Direction::Left));
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Right)),
            KeyAction::Turn(Direction::Right)
        );
    }

    #[test]
    fn test_wasd_keys() {
        let handler = InputHandler::new();

        let turn = |c| handler.handle_key_event(key(KeyCode::Char(c)));

        assert_eq!(turn('w'), KeyAction::Turn(Direction::Up));
        assert_eq!(turn('a'), KeyAction::Turn(Direction::Left));
        assert_eq!(turn('s'), KeyAction::Turn(Direction::Down));
        assert_eq!(
            handler.handle_key_event(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT)),
            KeyAction::Turn(Direction::Right)
        );
    }

    #[test]
    fn test_menu_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key_event(key(KeyCode::Char(' '))), KeyAction::Start);
        assert_eq!(handler.handle_key_event(key(KeyCode::Enter)), KeyAction::Start);
        assert_eq!(handler.handle_key_event(key(KeyCode::Char('h'))), KeyAction::ShowHighScores);
        assert_eq!(handler.handle_key_event(key(KeyCode::Char('n'))), KeyAction::EnterName);
        assert_eq!(handler.handle_key_event(key(KeyCode::Esc)), KeyAction::Menu);
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key_event(key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(
            handler.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_unknown_key() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key_event(key(KeyCode::Char('x'))), KeyAction::None);
    }

    #[test]
    fn test_name_entry_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_name_key(key(KeyCode::Char('q'))), NameInput::Push('q'));
        assert_eq!(handler.handle_name_key(key(KeyCode::Backspace)), NameInput::Backspace);
        assert_eq!(handler.handle_name_key(key(KeyCode::Enter)), NameInput::Submit);
        assert_eq!(handler.handle_name_key(key(KeyCode::Esc)), NameInput::Cancel);
        assert_eq!(
            handler.handle_name_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            NameInput::Ignore
        );
    }
}
