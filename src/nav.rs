//! Navigation sync: derives the navigation UI state from the scroll position
//! and issues slide-aligned scroll requests.

use std::fmt;

use log::{debug, warn};

use crate::error::{EngineError, SinkKind};
use crate::resolve::resolve;
use crate::slide::SlideDeck;

/// Scroll tolerance (document units) under which the page counts as "at top".
pub const DEFAULT_AT_TOP_TOLERANCE: f64 = 4.0;

/// Scroll geometry sampled from the host on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub scroll_top: f64,
    pub viewport_height: f64,
    /// Total scrollable document height.
    pub scroll_height: f64,
}

impl ScrollState {
    pub fn max_scroll(&self) -> f64 {
        self.scroll_height - self.viewport_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// The browsing environment as seen by the engine.
pub trait ScrollEnvironment {
    fn scroll_state(&self) -> ScrollState;
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
}

pub trait ProgressSink {
    /// `fraction` is in `[0, 1]`.
    fn set_progress(&mut self, fraction: f64);
}

pub trait CounterSink {
    fn set_label(&mut self, label: &str);
}

pub trait PrevNextSink {
    fn set_enabled(&mut self, prev: bool, next: bool);
}

pub trait BackToTopSink {
    /// Back-to-top is shown whenever the page is not at the top.
    fn set_visible(&mut self, visible: bool);
}

/// Optional UI sinks. An absent sink disables only its own feature.
#[derive(Default)]
pub struct NavSinks {
    pub progress: Option<Box<dyn ProgressSink>>,
    pub counter: Option<Box<dyn CounterSink>>,
    pub prev_next: Option<Box<dyn PrevNextSink>>,
    pub back_to_top: Option<Box<dyn BackToTopSink>>,
}

impl NavSinks {
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn with_counter(mut self, sink: impl CounterSink + 'static) -> Self {
        self.counter = Some(Box::new(sink));
        self
    }

    pub fn with_prev_next(mut self, sink: impl PrevNextSink + 'static) -> Self {
        self.prev_next = Some(Box::new(sink));
        self
    }

    pub fn with_back_to_top(mut self, sink: impl BackToTopSink + 'static) -> Self {
        self.back_to_top = Some(Box::new(sink));
        self
    }

    fn missing(&self) -> Vec<SinkKind> {
        let mut kinds = Vec::new();
        if self.progress.is_none() {
            kinds.push(SinkKind::Progress);
        }
        if self.counter.is_none() {
            kinds.push(SinkKind::Counter);
        }
        if self.prev_next.is_none() {
            kinds.push(SinkKind::PrevNext);
        }
        if self.back_to_top.is_none() {
            kinds.push(SinkKind::BackToTop);
        }
        kinds
    }
}

/// Derived navigation UI state, rebuilt whole on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct NavState {
    pub index: usize,
    pub progress_fraction: f64,
    pub counter_label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub at_top: bool,
}

impl NavState {
    pub fn derive(scroll: &ScrollState, index: usize, slide_count: usize, at_top_tolerance: f64) -> Self {
        let range = scroll.max_scroll();
        let progress_fraction = if range > 0.0 {
            (scroll.scroll_top / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        // NaN from a broken sample must not leak into sinks.
        let progress_fraction = if progress_fraction.is_nan() { 0.0 } else { progress_fraction };
        Self {
            index,
            progress_fraction,
            counter_label: format!("{} / {}", index + 1, slide_count),
            prev_enabled: index > 0,
            next_enabled: index + 1 < slide_count,
            at_top: scroll.scroll_top <= at_top_tolerance,
        }
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slide {} progress={:.1}% prev={} next={} top={}",
            self.counter_label,
            self.progress_fraction * 100.0,
            if self.prev_enabled { "on" } else { "off" },
            if self.next_enabled { "on" } else { "off" },
            self.at_top,
        )
    }
}

/// Commands issued by keys and navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Advance,
    Retreat,
    First,
    Last,
    /// Jump to a 0-based slide index (clamped).
    GoTo(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavOptions {
    pub at_top_tolerance: f64,
    pub behavior: ScrollBehavior,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            at_top_tolerance: DEFAULT_AT_TOP_TOLERANCE,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

pub struct NavigationSync<E: ScrollEnvironment> {
    deck: SlideDeck,
    env: E,
    sinks: NavSinks,
    options: NavOptions,
    missing: Vec<SinkKind>,
}

impl<E: ScrollEnvironment> NavigationSync<E> {
    pub fn new(deck: SlideDeck, env: E, sinks: NavSinks, options: NavOptions) -> Self {
        let missing = sinks.missing();
        for kind in &missing {
            warn!("nav: {}", EngineError::MissingSink(*kind));
        }
        Self {
            deck,
            env,
            sinks,
            options,
            missing,
        }
    }

    pub fn deck(&self) -> &SlideDeck {
        &self.deck
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Sinks absent at construction, as `MissingSink` errors.
    pub fn missing_sinks(&self) -> Vec<EngineError> {
        self.missing.iter().map(|k| EngineError::MissingSink(*k)).collect()
    }

    pub fn current_index_from_scroll(&self) -> usize {
        let s = self.env.scroll_state();
        // The deck is never empty, so resolution cannot fail.
        resolve(self.deck.slides(), s.scroll_top, s.viewport_height).unwrap_or(0)
    }

    /// Sample the environment, derive the navigation state, write every sink.
    pub fn update(&mut self) -> NavState {
        let scroll = self.env.scroll_state();
        let index = resolve(self.deck.slides(), scroll.scroll_top, scroll.viewport_height).unwrap_or(0);
        let state = NavState::derive(&scroll, index, self.deck.len(), self.options.at_top_tolerance);
        debug!("nav: scroll_top={} -> {}", scroll.scroll_top, state);

        if let Some(sink) = self.sinks.progress.as_mut() {
            sink.set_progress(state.progress_fraction);
        }
        if let Some(sink) = self.sinks.counter.as_mut() {
            sink.set_label(&state.counter_label);
        }
        if let Some(sink) = self.sinks.prev_next.as_mut() {
            sink.set_enabled(state.prev_enabled, state.next_enabled);
        }
        if let Some(sink) = self.sinks.back_to_top.as_mut() {
            sink.set_visible(!state.at_top);
        }
        state
    }

    /// Scroll to the slide at `target`, clamped into range. Returns the index
    /// actually targeted.
    pub fn go_to_index(&mut self, target: i64) -> usize {
        let index = self.deck.clamp_index(target);
        let top = self.deck.slides()[index].top_offset;
        debug!(
            "nav: go_to_index({target}) -> slide {index} '{}' at {top}",
            self.deck.slides()[index].id
        );
        self.env.scroll_to(top, self.options.behavior);
        index
    }

    pub fn go_to_relative(&mut self, delta: i64) -> usize {
        let current = self.current_index_from_scroll() as i64;
        self.go_to_index(current + delta)
    }

    /// The "scroll next" link below the hero advances like the next control.
    pub fn activate_next_link(&mut self) -> usize {
        self.go_to_relative(1)
    }

    pub fn activate_back_to_top(&mut self) -> usize {
        self.go_to_index(0)
    }

    pub fn apply(&mut self, command: NavCommand) -> usize {
        match command {
            NavCommand::Advance => self.go_to_relative(1),
            NavCommand::Retreat => self.go_to_relative(-1),
            NavCommand::First => self.go_to_index(0),
            NavCommand::Last => self.go_to_index(self.deck.last_index() as i64),
            NavCommand::GoTo(i) => self.go_to_index(i),
        }
    }
}
