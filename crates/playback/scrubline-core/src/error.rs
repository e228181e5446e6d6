//! Error types for the playback controller

use serde::{Deserialize, Serialize};

/// Errors raised by the controller, its configuration and the control registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlaybackError {
    /// A fraction handed to the commit step was NaN or infinite
    #[error("Fraction must be finite, got {value}")]
    NonFiniteFraction { value: f64 },

    /// Duration must be finite and strictly positive
    #[error("Invalid duration: {millis} ms")]
    InvalidDuration { millis: f64 },

    /// Tick cap must allow at least one tick
    #[error("Invalid tick cap: {cap}")]
    InvalidTickCap { cap: usize },

    /// Tag name rejected by the control registry
    #[error("Invalid control tag name: '{name}'")]
    InvalidTagName { name: String },

    /// Configuration could not be parsed
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

impl PlaybackError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NonFiniteFraction { .. } => "input",
            Self::InvalidDuration { .. } | Self::InvalidTickCap { .. } | Self::Config { .. } => {
                "config"
            }
            Self::InvalidTagName { .. } => "registry",
        }
    }
}

impl From<serde_json::Error> for PlaybackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            reason: err.to_string(),
        }
    }
}

/// Failure reported by an animation listener.
///
/// Any of these settles a negotiation the same way an explicit refusal does.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListenerError {
    /// The listener rejected its deferred answer
    #[error("Listener rejected: {reason}")]
    Rejected { reason: String },

    /// The listener dropped its resolver without answering
    #[error("Listener dropped the pending answer")]
    Dropped,

    /// A best-effort notification hook failed
    #[error("Listener hook failed: {reason}")]
    Hook { reason: String },
}

impl ListenerError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn hook(reason: impl Into<String>) -> Self {
        Self::Hook {
            reason: reason.into(),
        }
    }
}
