//! Smooth scroll with exponential ease-out.
//!
//! Each tick closes a fixed fraction of the remaining distance to the target,
//! so motion decelerates visibly and settles once within half a unit.

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    target: f64,
    /// Fraction of the remaining distance covered per tick.
    speed: f64,
}

const SETTLE_DISTANCE: f64 = 0.5;

impl SmoothScroll {
    pub fn new(target: f64, speed: f64) -> Self {
        Self {
            target,
            speed: speed.clamp(0.05, 1.0),
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Advance one tick from `pos`. Returns the new position and whether the
    /// animation has settled on the target.
    pub fn step(&self, pos: f64) -> (f64, bool) {
        let remaining = self.target - pos;
        if remaining.abs() <= SETTLE_DISTANCE {
            return (self.target, true);
        }
        let next = pos + remaining * self.speed;
        if (self.target - next).abs() <= SETTLE_DISTANCE {
            (self.target, true)
        } else {
            (next, false)
        }
    }
}
