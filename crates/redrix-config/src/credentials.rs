// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Credential storage behind a narrow get/set/remove interface.
//!
//! The core never prompts for credentials; it reads them through this trait
//! and reports a config error when they are absent.  The host wires in
//! whichever implementation fits its environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

/// Well-known credential keys.
pub const KEY_LLM_API: &str = "llm_api_key";
pub const KEY_STORE_DESCRIPTOR: &str = "store_descriptor";

/// Narrow key-value credential interface.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

// ─── File-backed store ───────────────────────────────────────────────────────

/// Credentials persisted as a flat JSON map in one file.
///
/// Defaults to `<config_dir>/redrix/credentials.json`.  The whole map is
/// rewritten on every mutation; credential churn is rare enough that this
/// stays simple.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default per-user location.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("redrix");
        Self {
            path: dir.join("credentials.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> anyhow::Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let map = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(map)
    }

    fn write_map(&self, map: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// Volatile credential store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: store pre-populated with one entry.
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
