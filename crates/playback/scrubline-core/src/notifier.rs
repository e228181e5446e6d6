//! Transition records emitted for observers.
//!
//! Each committed user-initiated transition yields its tagged event followed
//! by a `change` event carrying the same before/after pair.

use serde::{Deserialize, Serialize};

use crate::state::{PlaybackStateInfo, PlaybackTransition};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    Start,
    StartReverse,
    Stop,
    Pause,
    Finish,
    JumpPlaying,
    JumpPaused,
    Step,
    /// Fired alongside every other kind.
    Change,
}

impl TransitionKind {
    /// Event name as seen by observers.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::StartReverse => "startreverse",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Finish => "finish",
            Self::JumpPlaying => "jumpplaying",
            Self::JumpPaused => "jumppaused",
            Self::Step => "step",
            Self::Change => "change",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    pub kind: TransitionKind,
    pub transition: PlaybackTransition,
}

/// Ordered queue of transition events awaiting the host.
#[derive(Debug, Default)]
pub struct TransitionNotifier {
    queue: Vec<PlaybackEvent>,
}

impl TransitionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, kind: TransitionKind, from: PlaybackStateInfo, to: PlaybackStateInfo) {
        let transition = PlaybackTransition::new(from, to);
        log::debug!(
            "{}: {} -> {} ({:.3})",
            kind.event_name(),
            from.state().name(),
            to.state().name(),
            to.fraction()
        );
        self.queue.push(PlaybackEvent { kind, transition });
        if kind != TransitionKind::Change {
            self.queue.push(PlaybackEvent {
                kind: TransitionKind::Change,
                transition,
            });
        }
    }

    pub fn drain(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.queue)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
