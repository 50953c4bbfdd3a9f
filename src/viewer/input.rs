//! Viewer key bindings: numeric prefix accumulator and host actions.
//!
//! Pure logic, no I/O. Slide paging keys (arrows left/right, PageUp/Down,
//! Home/End) never reach this map; the session consumes them first.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const MAX_COUNT: u32 = 9_999;

/// Accumulated numeric prefix: `3g` jumps to slide 3, `10j` scrolls 10 steps.
pub(super) struct InputAccumulator {
    count: Option<u32>,
}

impl InputAccumulator {
    pub(super) fn new() -> Self {
        Self { count: None }
    }

    /// Feed a digit. Digits that would overflow are ignored.
    fn push_digit(&mut self, d: u32) {
        let new = self.count.unwrap_or(0).saturating_mul(10).saturating_add(d);
        if new <= MAX_COUNT {
            self.count = Some(new);
        }
    }

    fn take(&mut self) -> Option<u32> {
        self.count.take()
    }

    pub(super) fn peek(&self) -> Option<u32> {
        self.count
    }

    pub(super) fn reset(&mut self) {
        self.count = None;
    }

    pub(super) fn is_active(&self) -> bool {
        self.count.is_some()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Action {
    Quit,
    ScrollDown(u32),
    ScrollUp(u32),
    HalfPageDown(u32),
    HalfPageUp(u32),
    /// 1-based slide number.
    GoToSlide(u32),
    NextControl,
    PrevControl,
    BackToTop,
    ToggleTheme,
    ToggleSidebar,
    CancelInput,
    /// A digit was accumulated; caller should redraw the status bar.
    Digit,
}

/// Map a key event to an `Action`, consuming/updating the accumulator.
///
/// Returns `None` for unknown keys (caller should reset the accumulator).
pub(super) fn map_key_event(key: KeyEvent, acc: &mut InputAccumulator) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = key;

    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),

        (KeyCode::Esc, _) => {
            acc.reset();
            Some(Action::CancelInput)
        }

        (KeyCode::Char(c @ '0'..='9'), KeyModifiers::NONE) => {
            acc.push_digit(c as u32 - '0' as u32);
            Some(Action::Digit)
        }

        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(Action::ScrollDown(acc.take().unwrap_or(1))),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(Action::ScrollUp(acc.take().unwrap_or(1))),
        (KeyCode::Char('d'), _) | (KeyCode::Char(' '), _) => {
            Some(Action::HalfPageDown(acc.take().unwrap_or(1)))
        }
        (KeyCode::Char('u'), _) => Some(Action::HalfPageUp(acc.take().unwrap_or(1))),

        // Ng / NG: slide N; bare g / G are first / last.
        (KeyCode::Char('g'), _) => Some(Action::GoToSlide(acc.take().unwrap_or(1))),
        (KeyCode::Char('G'), _) => Some(Action::GoToSlide(acc.take().unwrap_or(u32::MAX))),

        (KeyCode::Char('n'), _) => Some(Action::NextControl),
        (KeyCode::Char('p'), _) => Some(Action::PrevControl),
        (KeyCode::Char('b'), _) => Some(Action::BackToTop),
        (KeyCode::Char('t'), _) => Some(Action::ToggleTheme),
        (KeyCode::Char('s'), _) => Some(Action::ToggleSidebar),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn simple_key(code: KeyCode) -> KeyEvent {
        key(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_5j_scroll_down() {
        let mut acc = InputAccumulator::new();
        let a = map_key_event(simple_key(KeyCode::Char('5')), &mut acc);
        assert_eq!(a, Some(Action::Digit));
        let a = map_key_event(simple_key(KeyCode::Char('j')), &mut acc);
        assert_eq!(a, Some(Action::ScrollDown(5)));
        assert!(!acc.is_active());
    }

    #[test]
    fn test_3g_goes_to_slide() {
        let mut acc = InputAccumulator::new();
        map_key_event(simple_key(KeyCode::Char('3')), &mut acc);
        assert_eq!(acc.peek(), Some(3));
        let a = map_key_event(simple_key(KeyCode::Char('g')), &mut acc);
        assert_eq!(a, Some(Action::GoToSlide(3)));
    }

    #[test]
    fn test_bare_g_and_big_g() {
        let mut acc = InputAccumulator::new();
        assert_eq!(map_key_event(simple_key(KeyCode::Char('g')), &mut acc), Some(Action::GoToSlide(1)));
        assert_eq!(
            map_key_event(key(KeyCode::Char('G'), KeyModifiers::SHIFT), &mut acc),
            Some(Action::GoToSlide(u32::MAX))
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut acc = InputAccumulator::new();
        assert_eq!(map_key_event(simple_key(KeyCode::Char('q')), &mut acc), Some(Action::Quit));
        assert_eq!(
            map_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut acc),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_esc_cancels_input() {
        let mut acc = InputAccumulator::new();
        map_key_event(simple_key(KeyCode::Char('5')), &mut acc);
        assert!(acc.is_active());
        let a = map_key_event(simple_key(KeyCode::Esc), &mut acc);
        assert_eq!(a, Some(Action::CancelInput));
        assert!(!acc.is_active());
    }

    #[test]
    fn test_count_overflow_is_capped() {
        let mut acc = InputAccumulator::new();
        for _ in 0..8 {
            map_key_event(simple_key(KeyCode::Char('9')), &mut acc);
        }
        assert_eq!(acc.peek(), Some(9_999));
    }

    #[test]
    fn test_controls() {
        let mut acc = InputAccumulator::new();
        assert_eq!(map_key_event(simple_key(KeyCode::Char('n')), &mut acc), Some(Action::NextControl));
        assert_eq!(map_key_event(simple_key(KeyCode::Char('p')), &mut acc), Some(Action::PrevControl));
        assert_eq!(map_key_event(simple_key(KeyCode::Char('b')), &mut acc), Some(Action::BackToTop));
        assert_eq!(map_key_event(simple_key(KeyCode::Char('t')), &mut acc), Some(Action::ToggleTheme));
        assert_eq!(map_key_event(simple_key(KeyCode::Char('s')), &mut acc), Some(Action::ToggleSidebar));
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let mut acc = InputAccumulator::new();
        assert_eq!(map_key_event(simple_key(KeyCode::Char('x')), &mut acc), None);
    }
}
