//! Navigation chrome model: the state the UI sinks write into.
//!
//! Sinks and links hold a `ChromeHandle` (a shared `Rc<RefCell<Chrome>>`)
//! and the host renders from the same handle. Everything lives on the one
//! thread that runs the event loop.

use std::cell::RefCell;
use std::rc::Rc;

use crate::nav::{BackToTopSink, CounterSink, NavSinks, PrevNextSink, ProgressSink};
use crate::visibility::NavLink;

/// Which sinks a host wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SinkSelect {
    Progress,
    Counter,
    PrevNext,
    BackToTop,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chrome {
    pub progress: f64,
    pub counter: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub back_to_top_visible: bool,
    /// Per navigation link, in list order: (slide id, current). The sidebar
    /// draws the current link highlighted with a `▸` marker.
    pub links: Vec<(String, bool)>,
    /// Sink writes since creation.
    pub writes: u64,
}

impl Chrome {
    /// Ids of links currently marked active.
    pub fn active_links(&self) -> Vec<&str> {
        self.links
            .iter()
            .filter(|(_, on)| *on)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct ChromeHandle(Rc<RefCell<Chrome>>);

impl ChromeHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Chrome {
        self.0.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&Chrome) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Sinks for every feature not listed in `disabled`.
    pub fn sinks(&self, disabled: &[SinkSelect]) -> NavSinks {
        let mut sinks = NavSinks::default();
        if !disabled.contains(&SinkSelect::Progress) {
            sinks = sinks.with_progress(self.clone());
        }
        if !disabled.contains(&SinkSelect::Counter) {
            sinks = sinks.with_counter(self.clone());
        }
        if !disabled.contains(&SinkSelect::PrevNext) {
            sinks = sinks.with_prev_next(self.clone());
        }
        if !disabled.contains(&SinkSelect::BackToTop) {
            sinks = sinks.with_back_to_top(self.clone());
        }
        sinks
    }

    /// One navigation link per id, registered in list order.
    pub fn links<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<Box<dyn NavLink>> {
        ids.into_iter()
            .map(|id| {
                let slot = {
                    let mut chrome = self.0.borrow_mut();
                    chrome.links.push((id.to_string(), false));
                    chrome.links.len() - 1
                };
                Box::new(ChromeLink {
                    id: id.to_string(),
                    slot,
                    chrome: self.clone(),
                }) as Box<dyn NavLink>
            })
            .collect()
    }
}

impl ProgressSink for ChromeHandle {
    fn set_progress(&mut self, fraction: f64) {
        let mut c = self.0.borrow_mut();
        c.progress = fraction;
        c.writes += 1;
    }
}

impl CounterSink for ChromeHandle {
    fn set_label(&mut self, label: &str) {
        let mut c = self.0.borrow_mut();
        label.clone_into(&mut c.counter);
        c.writes += 1;
    }
}

impl PrevNextSink for ChromeHandle {
    fn set_enabled(&mut self, prev: bool, next: bool) {
        let mut c = self.0.borrow_mut();
        c.prev_enabled = prev;
        c.next_enabled = next;
        c.writes += 1;
    }
}

impl BackToTopSink for ChromeHandle {
    fn set_visible(&mut self, visible: bool) {
        let mut c = self.0.borrow_mut();
        c.back_to_top_visible = visible;
        c.writes += 1;
    }
}

struct ChromeLink {
    id: String,
    slot: usize,
    chrome: ChromeHandle,
}

impl NavLink for ChromeLink {
    fn target_id(&self) -> &str {
        &self.id
    }

    fn set_active(&mut self, active: bool) {
        if let Some(link) = self.chrome.0.borrow_mut().links.get_mut(self.slot) {
            link.1 = active;
        }
    }
}
