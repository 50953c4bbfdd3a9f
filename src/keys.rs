//! Global keyboard paging.
//!
//! Pure logic, no I/O. A mapped key is consumed: the host must not also run
//! its default scrolling for it, or the page would move twice.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::nav::NavCommand;

/// Map a key to a slide navigation command.
///
/// Returns `None` for keys the engine does not own; the host handles those
/// with its own bindings.
pub fn map_paging_key(key: &KeyEvent) -> Option<NavCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Right | KeyCode::PageDown => Some(NavCommand::Advance),
        KeyCode::Left | KeyCode::PageUp => Some(NavCommand::Retreat),
        KeyCode::Home => Some(NavCommand::First),
        KeyCode::End => Some(NavCommand::Last),
        _ => None,
    }
}

/// Parse a key name as used in trace scripts (`right`, `pagedown`, `home`, ...).
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "right" | "arrowright" => KeyCode::Right,
        "left" | "arrowleft" => KeyCode::Left,
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "pageup" | "pgup" => KeyCode::PageUp,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        s if s.chars().count() == 1 => KeyCode::Char(s.chars().next()?),
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn paging_keys_are_consumed() {
        assert_eq!(map_paging_key(&key(KeyCode::Right)), Some(NavCommand::Advance));
        assert_eq!(map_paging_key(&key(KeyCode::PageDown)), Some(NavCommand::Advance));
        assert_eq!(map_paging_key(&key(KeyCode::Left)), Some(NavCommand::Retreat));
        assert_eq!(map_paging_key(&key(KeyCode::PageUp)), Some(NavCommand::Retreat));
        assert_eq!(map_paging_key(&key(KeyCode::Home)), Some(NavCommand::First));
        assert_eq!(map_paging_key(&key(KeyCode::End)), Some(NavCommand::Last));
    }

    #[test]
    fn other_keys_pass_through() {
        assert_eq!(map_paging_key(&key(KeyCode::Down)), None);
        assert_eq!(map_paging_key(&key(KeyCode::Char('j'))), None);
        assert_eq!(map_paging_key(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut k = key(KeyCode::Right);
        k.kind = KeyEventKind::Release;
        assert_eq!(map_paging_key(&k), None);
    }

    #[test]
    fn key_names() {
        assert_eq!(key_from_name("PageDown"), Some(KeyCode::PageDown));
        assert_eq!(key_from_name("arrowleft"), Some(KeyCode::Left));
        assert_eq!(key_from_name("j"), Some(KeyCode::Char('j')));
        assert_eq!(key_from_name("bogus"), None);
    }
}
