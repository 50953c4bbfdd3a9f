//! Terminal I/O layer: raw mode, slide content, sidebar, status bar.

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor, event,
    style::{self, Attribute, Stylize},
    terminal,
};
use std::io::{self, Write, stdout};

use super::state::Layout;
use crate::chrome::Chrome;
use crate::deck::LineKind;
use crate::page::PageLayout;
use crate::theme::Palette;

const PROGRESS_CELLS: usize = 12;

// ---------------------------------------------------------------------------
// RawGuard: restores raw mode / alternate screen / mouse capture on drop
// ---------------------------------------------------------------------------

pub(super) struct RawGuard {
    cleaned: bool,
}

impl RawGuard {
    pub(super) fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(event::EnableMouseCapture)?;
        out.execute(cursor::Hide)?;
        Ok(Self { cleaned: false })
    }

    pub(super) fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        let mut out = stdout();
        let _ = out.execute(style::ResetColor);
        let _ = out.execute(cursor::Show);
        let _ = out.execute(event::DisableMouseCapture);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

pub(super) fn check_tty() -> anyhow::Result<()> {
    use std::io::IsTerminal;
    // Only stdout matters. crossterm's `use-dev-tty` reads the keyboard from
    // /dev/tty, so a deck piped through stdin is fine.
    if !io::stdout().is_terminal() {
        anyhow::bail!(
            "slidesync viewer requires an interactive terminal.\n\
             \n\
             To replay a scripted session instead, use: slidesync trace <deck.md> <script>"
        );
    }
    Ok(())
}

/// What the status bar shows besides the navigation chrome.
pub(super) struct StatusExtras<'a> {
    pub filename: &'a str,
    pub acc_peek: Option<u32>,
    pub flash: Option<&'a str>,
}

/// Full redraw: content rows, sidebar, status bar. One flush per frame.
pub(super) fn draw_frame(
    page: &PageLayout,
    layout: &Layout,
    scroll_top: f64,
    chrome: &Chrome,
    palette: &Palette,
    extras: &StatusExtras,
) -> io::Result<()> {
    let mut out = stdout();
    out.queue(style::SetBackgroundColor(palette.bg))?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    draw_content(&mut out, page, layout, scroll_top, palette)?;
    if layout.has_sidebar() {
        draw_sidebar(&mut out, page, layout, chrome, palette)?;
    }
    draw_status_bar(&mut out, layout, chrome, palette, extras)?;
    out.queue(style::ResetColor)?;
    out.flush()
}

fn draw_content(
    out: &mut impl Write,
    page: &PageLayout,
    layout: &Layout,
    scroll_top: f64,
    palette: &Palette,
) -> io::Result<()> {
    let first = scroll_top.max(0.0).floor() as usize;
    for r in 0..layout.content_rows {
        let Some((slide, row)) = page.locate(first + r as usize) else {
            break;
        };
        let Some(line) = page.rows[slide].get(row) else {
            continue;
        };
        out.queue(cursor::MoveTo(layout.content_col + 1, r))?;
        let text: String = line.text.chars().take(layout.content_cols.saturating_sub(2) as usize).collect();
        let styled = match line.kind {
            LineKind::Heading(1) => text.with(palette.heading).attribute(Attribute::Bold).attribute(Attribute::Underlined),
            LineKind::Heading(_) => text.with(palette.heading).attribute(Attribute::Bold),
            LineKind::Code => text.with(palette.accent),
            LineKind::Quote => text.with(palette.muted).attribute(Attribute::Italic),
            LineKind::Text | LineKind::Bullet | LineKind::Blank => text.with(palette.fg),
        };
        write!(out, "{}", styled.on(palette.bg))?;
    }
    Ok(())
}

fn draw_sidebar(
    out: &mut impl Write,
    page: &PageLayout,
    layout: &Layout,
    chrome: &Chrome,
    palette: &Palette,
) -> io::Result<()> {
    let width = layout.sidebar_cols as usize;
    for r in 0..layout.content_rows {
        out.queue(cursor::MoveTo(0, r))?;
        let cell = match chrome.links.get(r as usize) {
            Some((id, active)) => {
                let label = page
                    .deck
                    .index_of(id)
                    .and_then(|i| page.labels.get(i))
                    .map(String::as_str)
                    .unwrap_or(id.as_str());
                let marker = if *active { '▸' } else { ' ' };
                let text = fit(&format!("{marker}{label}"), width);
                if *active {
                    text.with(palette.heading).on(palette.bar_bg).attribute(Attribute::Bold)
                } else {
                    text.with(palette.muted).on(palette.bar_bg)
                }
            }
            None => fit("", width).with(palette.muted).on(palette.bar_bg),
        };
        write!(out, "{cell}")?;
    }
    Ok(())
}

fn draw_status_bar(
    out: &mut impl Write,
    layout: &Layout,
    chrome: &Chrome,
    palette: &Palette,
    extras: &StatusExtras,
) -> io::Result<()> {
    out.queue(cursor::MoveTo(0, layout.status_row))?;
    let total = layout.total_cols as usize;

    let filled = (chrome.progress * PROGRESS_CELLS as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "█".repeat(filled.min(PROGRESS_CELLS)),
        "░".repeat(PROGRESS_CELLS - filled.min(PROGRESS_CELLS))
    );
    let pct = (chrome.progress * 100.0).round() as u32;
    let prev = if chrome.prev_enabled { "‹ prev" } else { "      " };
    let next = if chrome.next_enabled { "next ›" } else { "      " };
    let top = if chrome.back_to_top_visible { "b:top" } else { "     " };

    let tail = if let Some(msg) = extras.flash {
        msg.to_string()
    } else if let Some(n) = extras.acc_peek {
        format!(":{n}_")
    } else {
        "[←/→ PgUp/PgDn slide  j/k scroll  Ng goto  s sidebar  t theme  q quit]".to_string()
    };
    let line = format!(
        " {bar} {pct:>3}%  {counter:>7}  {prev} {next}  {top}  {name} | {tail}",
        counter = chrome.counter,
        name = extras.filename,
    );
    let cell = fit(&line, total);
    write!(out, "{}", cell.with(palette.fg).on(palette.bar_bg))?;
    Ok(())
}

/// Truncate or pad to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let mut s: String = text.chars().take(width).collect();
    let len = s.chars().count();
    s.extend(std::iter::repeat_n(' ', width - len));
    s
}
