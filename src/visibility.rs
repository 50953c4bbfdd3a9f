//! Section visibility tracker: keeps exactly one navigation link active for
//! the slide that most recently crossed the intersection threshold.
//!
//! This runs off the intersection signal, not the scroll bus, so it can
//! briefly disagree with the midpoint resolver during a fast smooth scroll.

use log::debug;

use crate::slide::SlideDeck;

/// Default intersection ratio a slide must exceed to become active.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// One navigation-list entry.
pub trait NavLink {
    /// Slide id this link points at.
    fn target_id(&self) -> &str;
    /// Mark the link as the current one, or clear it. One flag drives both
    /// the highlight and the current-item marker.
    fn set_active(&mut self, active: bool);
}

/// Intersection observation for one slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub index: usize,
    pub is_intersecting: bool,
    pub ratio: f64,
}

pub struct SectionVisibilityTracker {
    /// Per slide, the position of its link in `links` (if any).
    link_for_slide: Vec<Option<usize>>,
    links: Vec<Box<dyn NavLink>>,
    shown: Vec<bool>,
    active: Option<usize>,
    threshold: f64,
}

impl SectionVisibilityTracker {
    pub fn new(deck: &SlideDeck, links: Vec<Box<dyn NavLink>>, threshold: f64) -> Self {
        let link_for_slide = deck
            .slides()
            .iter()
            .map(|slide| links.iter().position(|l| l.target_id() == slide.id))
            .collect::<Vec<_>>();
        let unmatched = link_for_slide.iter().filter(|l| l.is_none()).count();
        if unmatched > 0 {
            debug!("visibility: {unmatched} slide(s) have no navigation link");
        }
        Self {
            link_for_slide,
            links,
            shown: vec![false; deck.len()],
            active: None,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Process one batch of entries in delivery order; the last qualifying
    /// entry wins.
    pub fn on_intersections(&mut self, entries: &[IntersectionEntry]) {
        for entry in entries {
            if !entry.is_intersecting || entry.ratio <= self.threshold {
                continue;
            }
            if entry.index >= self.shown.len() {
                debug!("visibility: ignoring entry for unknown slide {}", entry.index);
                continue;
            }
            for link in &mut self.links {
                link.set_active(false);
            }
            if let Some(pos) = self.link_for_slide[entry.index] {
                self.links[pos].set_active(true);
            }
            self.shown[entry.index] = true;
            self.active = Some(entry.index);
            debug!(
                "visibility: slide {} active (ratio={:.2})",
                entry.index, entry.ratio
            );
        }
    }

    /// Index of the slide whose link is currently active.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Id of the slide targeted by the active link, if that slide has one.
    pub fn active_link_target(&self) -> Option<&str> {
        let pos = self.link_for_slide[self.active?]?;
        Some(self.links[pos].target_id())
    }

    /// Whether the slide has ever crossed the threshold. Never resets.
    pub fn has_been_shown(&self, index: usize) -> bool {
        self.shown.get(index).copied().unwrap_or(false)
    }
}
