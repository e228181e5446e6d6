//! Scrubline Core (host-agnostic)
//!
//! Playback state machine for a media-style transport control
//! (play/pause/stop/reverse plus scrubber) driving an externally defined
//! animation. The animation is represented by an [`AnimationListener`] that
//! approves, refuses, or defers every transition; the host supplies frames
//! through a [`FrameSource`] and forwards [`PlaybackEvent`]s to observers.

pub mod clock;
pub mod config;
pub mod controller;
pub mod deferred;
pub mod error;
pub mod listener;
pub mod notifier;
pub mod registry;
pub mod state;
pub mod suspension;
pub mod ticks;

// Re-exports for hosts
pub use clock::{FrameHandle, FrameSource, ManualFrameSource, TimeBasedState};
pub use config::{PlaybackConfig, DEFAULT_DURATION_MILLIS};
pub use controller::PlaybackController;
pub use deferred::{Deferred, Negotiation, Resolver};
pub use error::{ListenerError, PlaybackError};
pub use listener::AnimationListener;
pub use notifier::{PlaybackEvent, TransitionKind, TransitionNotifier};
pub use registry::{ControlRegistry, DEFAULT_TAG};
pub use state::{ControlActivation, PlaybackState, PlaybackStateInfo, PlaybackTransition};
pub use suspension::{SuspensionControl, SuspensionPoll};
pub use ticks::{Tick, TickLabels, TickMark, TickRenderer};

/// Result type for controller operations.
pub type Result<T> = core::result::Result<T, PlaybackError>;
