//! Page session: wires the engine components to one scrollable page.
//!
//! The session is the single owner of all UI writes. The host feeds it raw
//! input (scroll deltas, keys, control activations) and calls `tick()` once
//! per rendered frame; the tick advances any smooth scroll, delivers the
//! coalesced bus notification, and runs one intersection observation.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyEvent;
use log::debug;

use crate::bus::{PendingFrame, ScrollSignalBus};
use crate::intersect::{IntersectionSignal, RootMargin, SlideExtent};
use crate::keys::map_paging_key;
use crate::nav::{NavCommand, NavOptions, NavSinks, NavState, NavigationSync, ScrollBehavior, ScrollEnvironment, ScrollState};
use crate::page::PageLayout;
use crate::smooth::SmoothScroll;
use crate::visibility::{NavLink, SectionVisibilityTracker};

/// Scroll position and any in-flight smooth scroll.
#[derive(Debug)]
pub struct Viewport {
    scroll_top: f64,
    viewport_height: f64,
    scroll_height: f64,
    animation: Option<SmoothScroll>,
    smooth_speed: f64,
    /// A programmatic jump happened that the bus has not heard about yet.
    moved: bool,
}

impl Viewport {
    fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.viewport_height).max(0.0)
    }

    fn clamp(&self, y: f64) -> f64 {
        y.clamp(0.0, self.max_scroll())
    }
}

/// `ScrollEnvironment` over the session's shared viewport.
#[derive(Clone)]
pub struct SharedViewport(Rc<RefCell<Viewport>>);

impl ScrollEnvironment for SharedViewport {
    fn scroll_state(&self) -> ScrollState {
        let v = self.0.borrow();
        ScrollState {
            scroll_top: v.scroll_top,
            viewport_height: v.viewport_height,
            scroll_height: v.scroll_height,
        }
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let mut v = self.0.borrow_mut();
        let target = v.clamp(top);
        match behavior {
            ScrollBehavior::Instant => {
                v.animation = None;
                if target != v.scroll_top {
                    v.scroll_top = target;
                    v.moved = true;
                }
            }
            ScrollBehavior::Smooth => {
                v.animation = Some(SmoothScroll::new(target, v.smooth_speed));
            }
        }
    }
}

/// Engine settings a session is built with.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub nav: NavOptions,
    pub threshold: f64,
    pub margin: RootMargin,
    pub smooth_speed: f64,
}

/// What one tick did.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Navigation state if the bus delivered a frame.
    pub nav: Option<NavState>,
    /// Intersection entries delivered to the tracker.
    pub crossings: usize,
    pub animating: bool,
}

impl TickOutcome {
    pub fn changed(&self) -> bool {
        self.nav.is_some() || self.crossings > 0 || self.animating
    }
}

pub struct Session {
    viewport: Rc<RefCell<Viewport>>,
    bus: ScrollSignalBus<PendingFrame>,
    nav: Rc<RefCell<NavigationSync<SharedViewport>>>,
    latest: Rc<RefCell<Option<NavState>>>,
    tracker: SectionVisibilityTracker,
    signal: IntersectionSignal,
    extents: Vec<SlideExtent>,
}

impl Session {
    pub fn new(
        page: &PageLayout,
        sinks: NavSinks,
        links: Vec<Box<dyn NavLink>>,
        options: SessionOptions,
    ) -> Self {
        let viewport = Rc::new(RefCell::new(Viewport {
            scroll_top: 0.0,
            viewport_height: page.viewport_height,
            scroll_height: page.scroll_height,
            animation: None,
            smooth_speed: options.smooth_speed,
            moved: false,
        }));
        let env = SharedViewport(Rc::clone(&viewport));
        let nav = Rc::new(RefCell::new(NavigationSync::new(
            page.deck.clone(),
            env,
            sinks,
            options.nav,
        )));
        let latest = Rc::new(RefCell::new(None));

        let mut bus = ScrollSignalBus::new(PendingFrame::default());
        {
            let nav = Rc::clone(&nav);
            let latest = Rc::clone(&latest);
            bus.subscribe(move || {
                let state = nav.borrow_mut().update();
                *latest.borrow_mut() = Some(state);
            });
        }

        let tracker = SectionVisibilityTracker::new(&page.deck, links, options.threshold);
        let signal = IntersectionSignal::new(options.threshold, options.margin);
        let extents = page.extents();

        let mut session = Self {
            viewport,
            bus,
            nav,
            latest,
            tracker,
            signal,
            extents,
        };
        // Initial paint: sinks and highlight reflect the page before any input.
        let state = session.nav.borrow_mut().update();
        *session.latest.borrow_mut() = Some(state);
        session.observe();
        session
    }

    pub fn scroll_top(&self) -> f64 {
        self.viewport.borrow().scroll_top
    }

    pub fn is_animating(&self) -> bool {
        self.viewport.borrow().animation.is_some()
    }

    /// Whether the next `tick()` has work: a pending bus frame or motion.
    pub fn needs_frame(&self) -> bool {
        self.bus.is_frame_scheduled() || self.is_animating()
    }

    /// Most recent navigation state.
    pub fn nav_state(&self) -> Option<NavState> {
        self.latest.borrow().clone()
    }

    pub fn tracker(&self) -> &SectionVisibilityTracker {
        &self.tracker
    }

    pub fn current_index(&self) -> usize {
        self.nav.borrow().current_index_from_scroll()
    }

    pub fn slide_count(&self) -> usize {
        self.nav.borrow().deck().len()
    }

    /// User scroll by `dy` (wheel, arrow). Cancels a smooth scroll.
    pub fn scroll_by(&mut self, dy: f64) {
        let top = self.scroll_top() + dy;
        self.scroll_to(top);
    }

    /// User scroll to an absolute position. Cancels a smooth scroll.
    pub fn scroll_to(&mut self, top: f64) {
        {
            let mut v = self.viewport.borrow_mut();
            v.animation = None;
            v.scroll_top = v.clamp(top);
        }
        self.bus.notify_scroll_occurred();
    }

    /// Run a navigation command; returns the targeted slide index.
    pub fn command(&mut self, command: NavCommand) -> usize {
        let index = self.nav.borrow_mut().apply(command);
        self.flush_jump();
        index
    }

    /// "Scroll next" link activation.
    pub fn activate_next_link(&mut self) -> usize {
        let index = self.nav.borrow_mut().activate_next_link();
        self.flush_jump();
        index
    }

    pub fn activate_back_to_top(&mut self) -> usize {
        let index = self.nav.borrow_mut().activate_back_to_top();
        self.flush_jump();
        index
    }

    /// Offer a key to the paging map. Returns true when consumed, in which
    /// case the host must skip its own handling for it.
    pub fn key(&mut self, key: &KeyEvent) -> bool {
        match map_paging_key(key) {
            Some(command) => {
                self.command(command);
                true
            }
            None => false,
        }
    }

    /// An instant jump is a scroll event like any other.
    fn flush_jump(&mut self) {
        let moved = std::mem::take(&mut self.viewport.borrow_mut().moved);
        if moved {
            self.bus.notify_scroll_occurred();
        }
    }

    /// One rendered frame.
    pub fn tick(&mut self) -> TickOutcome {
        let animating = self.step_animation();
        let nav = if self.bus.scheduler_mut().take() > 0 {
            self.bus.on_animation_frame();
            self.nav_state()
        } else {
            None
        };
        let crossings = self.observe();
        TickOutcome {
            nav,
            crossings,
            animating,
        }
    }

    fn step_animation(&mut self) -> bool {
        let stepped = {
            let mut v = self.viewport.borrow_mut();
            match v.animation.take() {
                Some(anim) => {
                    let (pos, done) = anim.step(v.scroll_top);
                    v.scroll_top = pos;
                    if !done {
                        v.animation = Some(anim);
                    }
                    Some(done)
                }
                None => None,
            }
        };
        match stepped {
            Some(done) => {
                self.bus.notify_scroll_occurred();
                if done {
                    debug!("session: smooth scroll settled at {}", self.scroll_top());
                }
                !done
            }
            None => false,
        }
    }

    fn observe(&mut self) -> usize {
        let (top, height) = {
            let v = self.viewport.borrow();
            (v.scroll_top, v.viewport_height)
        };
        let batch = self.signal.observe(&self.extents, top, height);
        self.tracker.on_intersections(&batch);
        batch.len()
    }
}
