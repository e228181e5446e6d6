//! Host-facing configuration for a playback controller.

use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

pub const DEFAULT_DURATION_MILLIS: f64 = 10_000.0;

fn default_duration_millis() -> f64 {
    DEFAULT_DURATION_MILLIS
}

/// Configuration consumed by the controller.
///
/// Fields are private so every change goes through a validating setter;
/// deserialization runs the same checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPlaybackConfig")]
pub struct PlaybackConfig {
    /// Time in milliseconds for a full traversal from 0 to 1.
    duration_millis: f64,
    /// Upper bound on rendered tick labels.
    max_ticks: Option<usize>,
    title: Option<String>,
}

/// Wire shape before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlaybackConfig {
    #[serde(default = "default_duration_millis")]
    duration_millis: f64,
    #[serde(default)]
    max_ticks: Option<usize>,
    #[serde(default)]
    title: Option<String>,
}

impl TryFrom<RawPlaybackConfig> for PlaybackConfig {
    type Error = PlaybackError;

    fn try_from(raw: RawPlaybackConfig) -> Result<Self, Self::Error> {
        let mut cfg = Self {
            duration_millis: raw.duration_millis,
            max_ticks: raw.max_ticks,
            title: None,
        };
        cfg.set_title(raw.title);
        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            duration_millis: DEFAULT_DURATION_MILLIS,
            max_ticks: None,
            title: None,
        }
    }
}

impl PlaybackConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, PlaybackError> {
        let raw: RawPlaybackConfig = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn validate(&self) -> Result<(), PlaybackError> {
        check_duration(self.duration_millis)?;
        check_tick_cap(self.max_ticks)
    }

    #[inline]
    pub fn duration_millis(&self) -> f64 {
        self.duration_millis
    }

    pub fn set_duration_millis(&mut self, millis: f64) -> Result<(), PlaybackError> {
        check_duration(millis)?;
        self.duration_millis = millis;
        Ok(())
    }

    pub fn with_duration_millis(mut self, millis: f64) -> Result<Self, PlaybackError> {
        self.set_duration_millis(millis)?;
        Ok(self)
    }

    #[inline]
    pub fn max_ticks(&self) -> Option<usize> {
        self.max_ticks
    }

    pub fn set_max_ticks(&mut self, cap: Option<usize>) -> Result<(), PlaybackError> {
        check_tick_cap(cap)?;
        self.max_ticks = cap;
        Ok(())
    }

    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title.filter(|t| !t.trim().is_empty());
    }
}

fn check_duration(millis: f64) -> Result<(), PlaybackError> {
    if millis.is_finite() && millis > 0.0 {
        Ok(())
    } else {
        Err(PlaybackError::InvalidDuration { millis })
    }
}

fn check_tick_cap(cap: Option<usize>) -> Result<(), PlaybackError> {
    match cap {
        Some(0) => Err(PlaybackError::InvalidTickCap { cap: 0 }),
        _ => Ok(()),
    }
}
