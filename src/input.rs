use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Steer(Direction),
    Restart,
    Quit,
    None,
}

/// Translates a key press. Every direction is forwarded; the game decides
/// whether a turn is legal.
pub fn map_key(key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Steer(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
            KeyAction::Steer(Direction::Down)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            KeyAction::Steer(Direction::Left)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            KeyAction::Steer(Direction::Right)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_steer() {
        assert_eq!(map_key(press(KeyCode::Up)), KeyAction::Steer(Direction::Up));
        assert_eq!(map_key(press(KeyCode::Down)), KeyAction::Steer(Direction::Down));
        assert_eq!(map_key(press(KeyCode::Left)), KeyAction::Steer(Direction::Left));
        assert_eq!(map_key(press(KeyCode::Right)), KeyAction::Steer(Direction::Right));
    }

    #[test]
    fn wasd_steers_in_either_case() {
        assert_eq!(map_key(press(KeyCode::Char('w'))), KeyAction::Steer(Direction::Up));
        assert_eq!(map_key(press(KeyCode::Char('A'))), KeyAction::Steer(Direction::Left));
        assert_eq!(map_key(press(KeyCode::Char('s'))), KeyAction::Steer(Direction::Down));
        assert_eq!(map_key(press(KeyCode::Char('D'))), KeyAction::Steer(Direction::Right));
    }

    #[test]
    fn control_keys() {
        assert_eq!(map_key(press(KeyCode::Char('r'))), KeyAction::Restart);
        assert_eq!(map_key(press(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(map_key(press(KeyCode::Esc)), KeyAction::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn other_keys_do_nothing() {
        assert_eq!(map_key(press(KeyCode::Char('x'))), KeyAction::None);
        assert_eq!(map_key(press(KeyCode::Enter)), KeyAction::None);
    }
}
