//! Viewport intersection signal.
//!
//! Computes how much of each slide lies inside the root rectangle (the
//! viewport shrunk by top/bottom margins) and reports a slide only when it
//! crosses the threshold, the way a browser intersection observer delivers
//! its batches. The first observation reports every slide.

use log::debug;

use crate::visibility::IntersectionEntry;

/// Vertical extent of one slide in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideExtent {
    pub top: f64,
    pub height: f64,
}

/// Root rectangle shrink, as fractions of the viewport height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: f64,
    pub bottom: f64,
}

pub struct IntersectionSignal {
    threshold: f64,
    margin: RootMargin,
    /// Above-threshold state per slide from the previous observation.
    previous: Option<Vec<bool>>,
}

impl IntersectionSignal {
    pub fn new(threshold: f64, margin: RootMargin) -> Self {
        Self {
            threshold,
            margin,
            previous: None,
        }
    }

    /// Intersection ratio and "is intersecting" for one slide.
    pub fn measure(&self, extent: SlideExtent, scroll_top: f64, viewport_height: f64) -> (f64, bool) {
        let root_top = scroll_top + viewport_height * self.margin.top;
        let root_bottom = scroll_top + viewport_height * (1.0 - self.margin.bottom);
        let bottom = extent.top + extent.height;
        if extent.height <= 0.0 {
            let inside = extent.top >= root_top && extent.top <= root_bottom;
            return (if inside { 1.0 } else { 0.0 }, inside);
        }
        let overlap = bottom.min(root_bottom) - extent.top.max(root_top);
        if overlap <= 0.0 {
            return (0.0, false);
        }
        ((overlap / extent.height).clamp(0.0, 1.0), true)
    }

    /// Observe the current viewport and return the batch of crossings.
    pub fn observe(
        &mut self,
        extents: &[SlideExtent],
        scroll_top: f64,
        viewport_height: f64,
    ) -> Vec<IntersectionEntry> {
        let mut batch = Vec::new();
        let mut current = Vec::with_capacity(extents.len());
        for (index, extent) in extents.iter().enumerate() {
            let (ratio, is_intersecting) = self.measure(*extent, scroll_top, viewport_height);
            // Same comparison the tracker activates on.
            let above = is_intersecting && ratio > self.threshold;
            let changed = match &self.previous {
                Some(prev) => prev.get(index).copied() != Some(above),
                None => true,
            };
            if changed {
                batch.push(IntersectionEntry {
                    index,
                    is_intersecting,
                    ratio,
                });
            }
            current.push(above);
        }
        if !batch.is_empty() {
            debug!(
                "intersect: {} crossing(s) at scroll_top={scroll_top}",
                batch.len()
            );
        }
        self.previous = Some(current);
        batch
    }
}
