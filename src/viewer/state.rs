//! Screen layout and loop exit reasons.

use log::debug;

/// Narrowest content area the sidebar is allowed to squeeze.
const MIN_CONTENT_COLS: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Layout {
    pub sidebar_cols: u16, // 0 when the sidebar is hidden
    pub content_col: u16,  // first content column (= sidebar_cols + gutter)
    pub content_cols: u16,
    pub content_rows: u16, // = term_rows - 1
    pub status_row: u16,   // = term_rows - 1
    pub total_cols: u16,
}

impl Layout {
    pub(super) fn has_sidebar(&self) -> bool {
        self.sidebar_cols > 0
    }
}

/// Split the terminal. `sidebar_open` is the user's toggle; the sidebar is
/// also hidden when the terminal is too narrow for it.
pub(super) fn compute_layout(term_cols: u16, term_rows: u16, sidebar_cols: u16, sidebar_open: bool) -> Layout {
    let sidebar_cols = if !sidebar_open {
        0
    } else if sidebar_cols > 0 && term_cols >= sidebar_cols + 1 + MIN_CONTENT_COLS {
        sidebar_cols
    } else {
        if sidebar_cols > 0 {
            debug!("layout: {term_cols} columns too narrow for a {sidebar_cols}-column sidebar, hiding it");
        }
        0
    };
    let gutter = if sidebar_cols > 0 { 1 } else { 0 };
    let content_col = sidebar_cols + gutter;
    Layout {
        sidebar_cols,
        content_col,
        content_cols: term_cols.saturating_sub(content_col).max(1),
        content_rows: term_rows.saturating_sub(1).max(1),
        status_row: term_rows.saturating_sub(1),
        total_cols: term_cols,
    }
}

/// Why the event loop exited the inner loop.
pub(super) enum ExitReason {
    Quit,
    Resize { new_cols: u16, new_rows: u16 },
    /// Same terminal size, different layout (sidebar toggled).
    Relayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_fits() {
        let l = compute_layout(100, 30, 18, true);
        assert!(l.has_sidebar());
        assert_eq!(l.content_col, 19);
        assert_eq!(l.content_cols, 81);
        assert_eq!(l.content_rows, 29);
        assert_eq!(l.status_row, 29);
    }

    #[test]
    fn narrow_terminal_hides_sidebar() {
        let l = compute_layout(40, 30, 18, true);
        assert!(!l.has_sidebar());
        assert_eq!(l.content_col, 0);
        assert_eq!(l.content_cols, 40);
    }

    #[test]
    fn zero_sidebar_is_hidden() {
        let l = compute_layout(100, 30, 0, true);
        assert!(!l.has_sidebar());
    }

    #[test]
    fn closed_sidebar_gives_content_full_width() {
        let open = compute_layout(100, 30, 18, true);
        let closed = compute_layout(100, 30, 18, false);
        assert!(open.has_sidebar());
        assert!(!closed.has_sidebar());
        assert_eq!(closed.content_col, 0);
        assert_eq!(closed.content_cols, 100);
        assert_eq!(closed.content_rows, open.content_rows);
    }

    #[test]
    fn tiny_terminal_stays_positive() {
        let l = compute_layout(0, 0, 18, true);
        assert_eq!(l.content_cols, 1);
        assert_eq!(l.content_rows, 1);
    }
}
