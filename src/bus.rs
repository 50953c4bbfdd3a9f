//! Scroll signal bus: coalesces raw scroll events into one notification per
//! animation frame.
//!
//! The host calls `notify_scroll_occurred()` for every raw scroll event and
//! `on_animation_frame()` when the frame it was asked for arrives. Between the
//! request and the frame, any number of raw events collapse into the single
//! pending notification.

use log::debug;

/// Host hook for requesting one future animation-frame callback.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Scheduler for hosts that tick every loop iteration anyway and only need
/// to know whether a frame was asked for.
#[derive(Debug, Default)]
pub struct PendingFrame {
    requested: u32,
}

impl PendingFrame {
    /// Number of frame requests since the last `take()`.
    pub fn take(&mut self) -> u32 {
        std::mem::take(&mut self.requested)
    }
}

impl FrameScheduler for PendingFrame {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}

type Subscriber = Box<dyn FnMut()>;

pub struct ScrollSignalBus<S: FrameScheduler = PendingFrame> {
    scheduler: S,
    subscribers: Vec<Subscriber>,
    frame_scheduled: bool,
    /// Raw events folded into the pending frame (diagnostics only).
    coalesced: u32,
}

impl<S: FrameScheduler> ScrollSignalBus<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            subscribers: Vec::new(),
            frame_scheduled: false,
            coalesced: 0,
        }
    }

    /// Register a callback run once per frame that saw scrolling.
    /// There is no unsubscribe.
    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    pub fn notify_scroll_occurred(&mut self) {
        self.coalesced += 1;
        if self.frame_scheduled {
            return;
        }
        self.frame_scheduled = true;
        self.scheduler.request_frame();
    }

    /// Deliver the requested frame. A frame nobody asked for is ignored.
    pub fn on_animation_frame(&mut self) {
        if !self.frame_scheduled {
            return;
        }
        self.frame_scheduled = false;
        debug!(
            "bus: frame settled {} raw scroll event(s) for {} subscriber(s)",
            self.coalesced,
            self.subscribers.len()
        );
        self.coalesced = 0;
        for subscriber in &mut self.subscribers {
            subscriber();
        }
    }

    pub fn is_frame_scheduled(&self) -> bool {
        self.frame_scheduled
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
