//! Terminal slide viewer.
//!
//! Layout:
//!   col 0..sidebar_cols : navigation list (one link per slide, `s` toggles)
//!   col content_col..   : slide content, one full viewport per slide minimum
//!   row term_rows-1     : status bar (progress, counter, prev/next, back-to-top)
//!
//! The loop is the single owner of the page: input is fed to the session,
//! and once per frame budget the session ticks (smooth scroll step, coalesced
//! scroll notification, intersection observation) and the screen redraws.

mod input;
mod state;
mod terminal;

use crossterm::event::{self, Event, KeyEventKind, MouseEventKind};
use crossterm::terminal as crossterm_terminal;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::chrome::ChromeHandle;
use crate::config::Config;
use crate::deck::parse_deck;
use crate::input::InputSource;
use crate::nav::NavCommand;
use crate::page::PageLayout;
use crate::session::{Session, SessionOptions};
use crate::theme::{self, Theme};

use input::{Action, InputAccumulator, map_key_event};
use state::{ExitReason, Layout};
use terminal::StatusExtras;

/// Idle poll timeout when nothing is moving.
const IDLE_POLL: Duration = Duration::from_secs(3600);

/// Run the terminal viewer.
///
/// `prefs` is where the theme preference is persisted (None disables it).
pub fn run(source: InputSource, config: Config, prefs: Option<PathBuf>) -> anyhow::Result<()> {
    let filename = source.display_name().to_string();
    let markdown = source.read_to_string()?;
    let slides = parse_deck(&markdown)?;
    info!("viewer: {} slide(s) from {filename}", slides.len());

    terminal::check_tty()?;

    let mut theme = prefs
        .as_deref()
        .and_then(theme::load_preference)
        .unwrap_or(config.theme);

    let (mut term_cols, mut term_rows) = crossterm_terminal::size()
        .map_err(|e| anyhow::anyhow!("failed to get terminal size: {e}"))?;
    let mut sidebar_open = true;

    let mut guard = terminal::RawGuard::enter()?;

    // Slide index carried across resizes and sidebar toggles.
    let mut slide_carry: usize = 0;

    // Outer loop: each iteration is a fresh page load (initial, resize,
    // sidebar toggle).
    'outer: loop {
        let layout = state::compute_layout(term_cols, term_rows, config.viewer.sidebar_cols, sidebar_open);
        let page = PageLayout::from_deck(
            &slides,
            layout.content_cols.saturating_sub(2) as usize,
            layout.content_rows as usize,
        )?;
        let chrome = ChromeHandle::new();
        let links = if layout.has_sidebar() {
            chrome.links(page.deck.slides().iter().map(|s| s.id.as_str()))
        } else {
            Vec::new()
        };
        let options = SessionOptions {
            nav: config.engine.nav_options(),
            threshold: config.engine.threshold,
            margin: config.engine.margin,
            smooth_speed: config.viewer.smooth_speed,
        };
        let mut session = Session::new(&page, chrome.sinks(&[]), links, options);
        if slide_carry > 0 {
            let idx = slide_carry.min(page.deck.last_index());
            session.scroll_to(page.deck.slides()[idx].top_offset);
            session.tick();
        }

        let mut acc = InputAccumulator::new();
        let mut flash: Option<String> = None;
        let mut dirty = true;
        let mut last_frame = Instant::now()
            .checked_sub(config.viewer.frame_budget)
            .unwrap_or_else(Instant::now);

        let exit = loop {
            let budget_left = config.viewer.frame_budget.saturating_sub(last_frame.elapsed());
            let wants_frame = dirty || session.needs_frame();

            if wants_frame && budget_left.is_zero() {
                let outcome = session.tick();
                if dirty || outcome.changed() {
                    draw(&page, &layout, &session, &chrome, theme, &StatusExtras {
                        filename: &filename,
                        acc_peek: acc.peek(),
                        flash: flash.as_deref(),
                    })?;
                }
                dirty = false;
                last_frame = Instant::now();
                continue;
            }

            let timeout = if wants_frame { budget_left } else { IDLE_POLL };
            if !event::poll(timeout)? {
                continue;
            }
            let ev = event::read()?;
            debug!("event: {ev:?}");

            match ev {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    // Flash messages last until the next key.
                    if flash.take().is_some() {
                        dirty = true;
                    }
                    if session.key(&key_event) {
                        acc.reset();
                        continue;
                    }
                    let scroll_step = config.viewer.scroll_step as f64;
                    let half_page = (layout.content_rows as f64 / 2.0).max(1.0);
                    match map_key_event(key_event, &mut acc) {
                        Some(Action::Quit) => break ExitReason::Quit,
                        Some(Action::CancelInput) | Some(Action::Digit) => dirty = true,
                        Some(Action::ScrollDown(n)) => session.scroll_by(n as f64 * scroll_step),
                        Some(Action::ScrollUp(n)) => session.scroll_by(-(n as f64) * scroll_step),
                        Some(Action::HalfPageDown(n)) => session.scroll_by(n as f64 * half_page),
                        Some(Action::HalfPageUp(n)) => session.scroll_by(-(n as f64) * half_page),
                        Some(Action::GoToSlide(n)) => {
                            let target = session.command(NavCommand::GoTo(n as i64 - 1));
                            debug!("goto slide {n} -> index {target}");
                        }
                        Some(Action::NextControl) => {
                            session.command(NavCommand::Advance);
                        }
                        Some(Action::PrevControl) => {
                            session.command(NavCommand::Retreat);
                        }
                        Some(Action::BackToTop) => {
                            session.activate_back_to_top();
                        }
                        Some(Action::ToggleTheme) => {
                            theme = theme.toggled();
                            if let Some(path) = prefs.as_deref()
                                && let Err(e) = theme::store_preference(path, theme)
                            {
                                warn!("prefs: {e:#}");
                            }
                            flash = Some(format!("theme: {theme}"));
                            dirty = true;
                        }
                        Some(Action::ToggleSidebar) => break ExitReason::Relayout,
                        None => {
                            if acc.is_active() {
                                acc.reset();
                                dirty = true;
                            }
                        }
                    }
                }

                Event::Mouse(mouse) => {
                    let step = config.viewer.scroll_step as f64;
                    match mouse.kind {
                        MouseEventKind::ScrollDown => session.scroll_by(step),
                        MouseEventKind::ScrollUp => session.scroll_by(-step),
                        _ => {}
                    }
                }

                Event::Resize(new_cols, new_rows) => {
                    break ExitReason::Resize { new_cols, new_rows };
                }

                _ => {}
            }
        };

        slide_carry = session.current_index();
        match exit {
            ExitReason::Quit => break 'outer,
            ExitReason::Resize { new_cols, new_rows } => {
                debug!("resize: {new_cols}x{new_rows}, reloading page at slide {slide_carry}");
                term_cols = new_cols;
                term_rows = new_rows;
            }
            ExitReason::Relayout => {
                sidebar_open = !sidebar_open;
                debug!("sidebar: open={sidebar_open}, reloading page at slide {slide_carry}");
            }
        }
    }

    guard.cleanup();
    Ok(())
}

fn draw(
    page: &PageLayout,
    layout: &Layout,
    session: &Session,
    chrome: &ChromeHandle,
    theme: Theme,
    extras: &StatusExtras,
) -> anyhow::Result<()> {
    let palette = theme.palette();
    chrome.with(|c| terminal::draw_frame(page, layout, session.scroll_top(), c, &palette, extras))?;
    Ok(())
}
