use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub mod drive;
pub mod listener;

pub use listener::{ListenerCall, ListenerHandle, Reply, ScriptedListener, StepReply};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    configs: HashMap<String, String>,
    #[serde(rename = "tick-tables")]
    tick_tables: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a String> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod configs {
    use super::*;
    use scrubline_core::PlaybackConfig;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }

    /// Parse and validate a named configuration.
    pub fn load(name: &str) -> Result<PlaybackConfig> {
        let text = json(name)?;
        PlaybackConfig::from_json(&text).with_context(|| format!("invalid config fixture {name}"))
    }
}

pub mod tick_tables {
    use super::*;
    use scrubline_core::TickMark;

    pub fn keys() -> Vec<String> {
        MANIFEST.tick_tables.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<Vec<TickMark>> {
        let rel = lookup(&MANIFEST.tick_tables, "tick table", name)?;
        load_json(rel)
    }
}
