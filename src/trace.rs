//! Scripted scroll sessions against a headless page.
//!
//! A trace script is line oriented; `#` starts a comment:
//!
//! ```text
//! scroll 1250     # user scroll to an absolute offset
//! wheel -120      # user scroll by a delta
//! frame 2         # deliver N animation frames (default 1)
//! settle          # deliver frames until any smooth scroll has landed
//! key pagedown    # global key press
//! next | prev     # prev/next controls
//! next-link       # the "scroll next" link
//! top             # back-to-top control
//! goto 3          # jump to slide 3 (1-based)
//! ```

use std::io::Write;

use anyhow::{Context, bail};
use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use log::debug;

use crate::chrome::ChromeHandle;
use crate::keys::key_from_name;
use crate::nav::NavCommand;
use crate::session::Session;

/// Upper bound on frames a single `settle` may deliver.
const MAX_SETTLE_FRAMES: u32 = 600;

/// Upper bound on `frame N`.
const MAX_FRAME_BURST: u32 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceStep {
    Scroll(f64),
    Wheel(f64),
    Frame(u32),
    Settle,
    Key(String),
    Next,
    Prev,
    NextLink,
    Top,
    GoTo(i64),
}

pub fn parse_script(text: &str) -> anyhow::Result<Vec<TraceStep>> {
    let mut steps = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("line {}: '{}'", i + 1, raw.trim()))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> anyhow::Result<TraceStep> {
    let mut parts = line.split_whitespace();
    let word = parts.next().unwrap_or("");
    let arg = parts.next();
    if parts.next().is_some() {
        bail!("too many arguments");
    }
    let number = |arg: Option<&str>| -> anyhow::Result<f64> {
        let a = arg.with_context(|| format!("'{word}' needs a number"))?;
        let v: f64 = a.parse().with_context(|| format!("'{a}' is not a number"))?;
        if !v.is_finite() {
            bail!("'{a}' is not finite");
        }
        Ok(v)
    };
    let step = match word {
        "scroll" => TraceStep::Scroll(number(arg)?),
        "wheel" => TraceStep::Wheel(number(arg)?),
        "frame" => match arg {
            None => TraceStep::Frame(1),
            Some(a) => {
                let n: u32 = a.parse().with_context(|| format!("bad frame count '{a}'"))?;
                if n > MAX_FRAME_BURST {
                    bail!("frame count {n} exceeds {MAX_FRAME_BURST}");
                }
                TraceStep::Frame(n)
            }
        },
        "settle" => TraceStep::Settle,
        "key" => {
            let name = arg.context("'key' needs a key name")?;
            if key_from_name(name).is_none() {
                bail!("unknown key '{name}'");
            }
            TraceStep::Key(name.to_string())
        }
        "next" => TraceStep::Next,
        "prev" => TraceStep::Prev,
        "next-link" => TraceStep::NextLink,
        "top" => TraceStep::Top,
        "goto" => TraceStep::GoTo(number(arg)? as i64),
        other => bail!("unknown command '{other}'"),
    };
    if arg.is_some() && matches!(step, TraceStep::Settle | TraceStep::Next | TraceStep::Prev | TraceStep::NextLink | TraceStep::Top) {
        bail!("'{word}' takes no argument");
    }
    Ok(step)
}

/// Replay `steps`, writing one line per delivered navigation update.
pub fn run_trace(
    session: &mut Session,
    chrome: &ChromeHandle,
    steps: &[TraceStep],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut frame_no = 0u64;
    writeln!(out, "init: {}", describe(session, chrome))?;
    for step in steps {
        debug!("trace: {step:?}");
        match step {
            TraceStep::Scroll(y) => session.scroll_to(*y),
            TraceStep::Wheel(dy) => session.scroll_by(*dy),
            TraceStep::Frame(n) => {
                for _ in 0..*n {
                    frame(session, chrome, &mut frame_no, out)?;
                }
            }
            TraceStep::Settle => {
                let mut delivered = 0;
                loop {
                    frame(session, chrome, &mut frame_no, out)?;
                    delivered += 1;
                    if !session.is_animating() || delivered >= MAX_SETTLE_FRAMES {
                        break;
                    }
                }
            }
            TraceStep::Key(name) => {
                let Some(code) = key_from_name(name) else {
                    bail!("unknown key '{name}'");
                };
                let key = KeyEvent {
                    code,
                    modifiers: KeyModifiers::NONE,
                    kind: KeyEventKind::Press,
                    state: KeyEventState::NONE,
                };
                if !session.key(&key) {
                    writeln!(out, "key {name}: passed through")?;
                }
            }
            TraceStep::Next => {
                session.command(NavCommand::Advance);
            }
            TraceStep::Prev => {
                session.command(NavCommand::Retreat);
            }
            TraceStep::NextLink => {
                session.activate_next_link();
            }
            TraceStep::Top => {
                session.activate_back_to_top();
            }
            TraceStep::GoTo(n) => {
                session.command(NavCommand::GoTo(n.saturating_sub(1)));
            }
        }
    }
    Ok(())
}

fn frame(
    session: &mut Session,
    chrome: &ChromeHandle,
    frame_no: &mut u64,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    *frame_no += 1;
    let outcome = session.tick();
    if outcome.changed() {
        writeln!(out, "frame {frame_no}: {}", describe(session, chrome))?;
    }
    Ok(())
}

fn describe(session: &Session, chrome: &ChromeHandle) -> String {
    let active = chrome.with(|c| c.active_links().join(","));
    let active = if active.is_empty() { "-".to_string() } else { active };
    match session.nav_state() {
        Some(state) => format!(
            "scroll_top={} {} active={}",
            session.scroll_top(),
            state,
            active
        ),
        None => format!("scroll_top={} active={}", session.scroll_top(), active),
    }
}
