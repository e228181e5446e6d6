//! Playback states, observer snapshots and control activation.

use serde::{Deserialize, Serialize};

/// Discrete playback state of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Resting at fraction 0
    #[default]
    Stopped,
    /// Advancing towards fraction 1
    Playing,
    /// Advancing towards fraction 0
    PlayingBackwards,
    /// Resting strictly between the boundaries
    Paused,
    /// Resting at fraction 1
    Finished,
}

impl PlaybackState {
    /// Get the name of this playback state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::PlayingBackwards => "playing_backwards",
            Self::Paused => "paused",
            Self::Finished => "finished",
        }
    }

    /// Check if the controller is advancing in either direction
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing | Self::PlayingBackwards)
    }

    /// Check if this is a resting state
    #[inline]
    pub fn is_resting(&self) -> bool {
        !self.is_playing()
    }

    /// Playing state for the requested direction
    #[inline]
    pub fn playing(backwards: bool) -> Self {
        if backwards {
            Self::PlayingBackwards
        } else {
            Self::Playing
        }
    }
}

impl From<&str> for PlaybackState {
    fn from(s: &str) -> Self {
        match s {
            "playing" => Self::Playing,
            "playing_backwards" => Self::PlayingBackwards,
            "paused" => Self::Paused,
            "finished" => Self::Finished,
            _ => Self::Stopped,
        }
    }
}

/// Immutable snapshot of a controller handed to listeners and observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackStateInfo {
    state: PlaybackState,
    fraction: f64,
    #[serde(rename = "isSuspended")]
    suspended: bool,
}

impl PlaybackStateInfo {
    pub(crate) fn new(state: PlaybackState, fraction: f64, suspended: bool) -> Self {
        Self {
            state,
            fraction,
            suspended,
        }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Completion fraction in [0, 1]
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// True while a listener answer is outstanding
    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Copy of this snapshot with a candidate fraction substituted.
    #[inline]
    pub(crate) fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }

    pub(crate) fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
    }

    pub(crate) fn set_fraction(&mut self, fraction: f64) {
        self.fraction = fraction;
    }

    pub(crate) fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }
}

/// Before/after pair recorded when a user-initiated transition completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackTransition {
    from: PlaybackStateInfo,
    to: PlaybackStateInfo,
}

impl PlaybackTransition {
    pub fn new(from: PlaybackStateInfo, to: PlaybackStateInfo) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn from(&self) -> &PlaybackStateInfo {
        &self.from
    }

    #[inline]
    pub fn to(&self) -> &PlaybackStateInfo {
        &self.to
    }
}

/// Which transport buttons are enabled for a given snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlActivation {
    pub play: bool,
    pub reverse: bool,
    pub pause: bool,
    pub stop: bool,
}

impl ControlActivation {
    pub fn for_state(info: &PlaybackStateInfo) -> Self {
        match info.state() {
            PlaybackState::Playing => Self {
                play: false,
                reverse: true,
                pause: true,
                stop: true,
            },
            PlaybackState::PlayingBackwards => Self {
                play: true,
                reverse: false,
                pause: true,
                stop: true,
            },
            PlaybackState::Paused | PlaybackState::Stopped | PlaybackState::Finished => Self {
                play: true,
                reverse: true,
                pause: false,
                stop: info.fraction() > 0.0,
            },
        }
    }
}
