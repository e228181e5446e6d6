//! Per-frame clock driving the completion fraction during playback.
//!
//! The host owns the display loop and implements [`FrameSource`]; each
//! requested frame comes back through `PlaybackController::on_frame`.

use serde::{Deserialize, Serialize};

/// Opaque handle of one requested frame callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// Monotonic source of once-per-refresh callbacks.
pub trait FrameSource {
    /// Schedule one callback for the next refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Forget a previously requested callback.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Current monotonic time in milliseconds.
    fn now_millis(&self) -> f64;
}

/// Clock bookkeeping attached while a listener is registered.
#[derive(Debug, Clone)]
pub struct TimeBasedState {
    duration_millis: f64,
    millis_elapsed: f64,
    timer: Option<FrameHandle>,
    one_off: bool,
    /// Timestamp of the first callback of the current segment.
    segment_start: Option<f64>,
    /// Fraction captured at `segment_start`.
    segment_fraction: f64,
}

impl TimeBasedState {
    pub fn new(duration_millis: f64) -> Self {
        Self {
            duration_millis,
            millis_elapsed: 0.0,
            timer: None,
            one_off: false,
            segment_start: None,
            segment_fraction: 0.0,
        }
    }

    #[inline]
    pub fn duration_millis(&self) -> f64 {
        self.duration_millis
    }

    #[inline]
    pub fn millis_elapsed(&self) -> f64 {
        self.millis_elapsed
    }

    #[inline]
    pub fn timer(&self) -> Option<FrameHandle> {
        self.timer
    }

    #[inline]
    pub fn is_one_off(&self) -> bool {
        self.one_off
    }

    pub(crate) fn set_duration_millis(&mut self, millis: f64) {
        self.duration_millis = millis;
    }

    /// Begin a new segment; elapsed time restarts from the next callback.
    pub fn start<F: FrameSource>(&mut self, frames: &mut F, one_off: bool) {
        self.cancel(frames);
        self.one_off = one_off;
        self.timer = Some(frames.request_frame());
    }

    /// Invalidate the pending callback and clear elapsed-time bookkeeping.
    pub fn cancel<F: FrameSource>(&mut self, frames: &mut F) {
        if let Some(handle) = self.timer.take() {
            frames.cancel_frame(handle);
        }
        self.segment_start = None;
        self.millis_elapsed = 0.0;
    }

    /// Consume the callback if it is the one currently scheduled.
    pub(crate) fn accept(&mut self, handle: FrameHandle) -> bool {
        if self.timer == Some(handle) {
            self.timer = None;
            true
        } else {
            false
        }
    }

    /// Keep the segment running with another callback.
    pub(crate) fn reschedule<F: FrameSource>(&mut self, frames: &mut F) {
        self.timer = Some(frames.request_frame());
    }

    /// Candidate fraction for a callback at `timestamp`.
    pub(crate) fn advance(&mut self, timestamp: f64, fraction: f64, backwards: bool) -> f64 {
        let start = match self.segment_start {
            Some(start) => start,
            None => {
                self.segment_start = Some(timestamp);
                self.segment_fraction = fraction;
                timestamp
            }
        };
        self.millis_elapsed = (timestamp - start).max(0.0);
        let delta = self.millis_elapsed / self.duration_millis;
        if backwards {
            (self.segment_fraction - delta).max(0.0)
        } else {
            (self.segment_fraction + delta).min(1.0)
        }
    }

    /// Exclude `waited` milliseconds of suspension from elapsed time.
    pub(crate) fn shift_start(&mut self, waited: f64) {
        if let Some(start) = self.segment_start.as_mut() {
            *start += waited.max(0.0);
            log::trace!("clock re-anchored by {waited:.1} ms");
        }
    }
}

/// In-memory frame source with manual time, for hosts without a display loop.
#[derive(Debug, Default, Clone)]
pub struct ManualFrameSource {
    now: f64,
    next_id: u64,
    pending: Vec<FrameHandle>,
    requested: usize,
    cancelled: usize,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `millis`.
    pub fn advance(&mut self, millis: f64) {
        self.now += millis;
    }

    /// Take the oldest outstanding callback, if any.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Total callbacks ever requested.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Total callbacks cancelled while still pending.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameSource for ManualFrameSource {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }

    fn now_millis(&self) -> f64 {
        self.now
    }
}
