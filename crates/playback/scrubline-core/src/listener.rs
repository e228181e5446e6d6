//! Contract implemented by the animation a controller drives.

use crate::deferred::Negotiation;
use crate::error::ListenerError;
use crate::state::PlaybackStateInfo;

/// Externally defined animation consulted before every transition.
///
/// Only [`move_to`](AnimationListener::move_to) is required. A listener
/// without a `start` hook approves every start; one without a `step` hook
/// turns `step` into a no-op.
pub trait AnimationListener {
    /// Asked before playback starts in the given direction.
    fn start(&mut self, fraction: f64, backwards: bool) -> Negotiation<bool> {
        let _ = (fraction, backwards);
        Negotiation::Immediate(true)
    }

    /// Asked on every clock tick and every explicit jump; `state` already
    /// carries the candidate fraction.
    fn move_to(&mut self, state: &PlaybackStateInfo) -> Negotiation<bool>;

    /// Told that a resting state was reached. Failures are logged and dropped.
    fn stopped(&mut self, state: &PlaybackStateInfo) -> Result<(), ListenerError> {
        let _ = state;
        Ok(())
    }

    /// Asked for the fraction one step away; `None` inside the negotiation refuses.
    fn step(&mut self, fraction: f64, backwards: bool) -> Option<Negotiation<Option<f64>>> {
        let _ = (fraction, backwards);
        None
    }
}
