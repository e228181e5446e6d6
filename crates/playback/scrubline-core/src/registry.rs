//! Application-owned registry of control tag names.

use indexmap::IndexSet;

use crate::error::PlaybackError;

pub const DEFAULT_TAG: &str = "playback-control";

/// Tag names under which the embedding application exposes playback controls.
#[derive(Debug, Default, Clone)]
pub struct ControlRegistry {
    tags: IndexSet<String>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tag`. Returns `Ok(false)` if it was already registered.
    pub fn register(&mut self, tag: &str) -> Result<bool, PlaybackError> {
        if !is_valid_tag(tag) {
            return Err(PlaybackError::InvalidTagName {
                name: tag.to_string(),
            });
        }
        Ok(self.tags.insert(tag.to_string()))
    }

    pub fn register_default(&mut self) -> bool {
        self.tags.insert(DEFAULT_TAG.to_string())
    }

    #[inline]
    pub fn is_registered(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Tags in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Custom-element style names: lowercase start, a hyphen, `[a-z0-9._-]` only.
fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && tag.contains('-')
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'))
}
