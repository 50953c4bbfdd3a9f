//! Current-slide resolution from the scroll position.
//!
//! The probe point is the vertical midpoint of the viewport in document
//! coordinates. A slide is current once its top edge has passed the probe,
//! so a slide taller than the viewport stays current while it fills the middle.

use crate::error::{EngineError, Result};
use crate::slide::Slide;

/// Fraction of the viewport height at which the probe sits.
pub const PROBE_RATIO: f64 = 0.5;

/// Document coordinate used to decide which slide is current.
pub fn probe_y(scroll_top: f64, viewport_height: f64) -> f64 {
    scroll_top + viewport_height * PROBE_RATIO
}

/// Index of the last slide whose top is at or above the probe point.
///
/// Falls back to 0 when the probe is above the first slide. The result is
/// non-decreasing in `scroll_top` and always within `[0, slides.len()-1]`.
pub fn resolve(slides: &[Slide], scroll_top: f64, viewport_height: f64) -> Result<usize> {
    if slides.is_empty() {
        return Err(EngineError::InvalidState(
            "cannot resolve a slide index without slides".into(),
        ));
    }
    let y = probe_y(scroll_top, viewport_height);
    // Slides are sorted, so the qualifying prefix is contiguous.
    let count = slides.partition_point(|s| s.top_offset <= y);
    Ok(count.saturating_sub(1))
}
