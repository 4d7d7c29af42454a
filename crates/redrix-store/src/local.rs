// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Local fallback: the full history as one ordered JSON array in one file.
//!
//! Defaults to `<data_dir>/redrix/history.json`.  Capped at the most recent
//! `cap` messages; the oldest are evicted first.  Read-modify-write here is
//! unsynchronized — the session's single-flight rule keeps saves serial.

use std::path::{Path, PathBuf};

use tracing::debug;

use redrix_model::ChatMessage;

use crate::StoreError;

pub struct LocalStore {
    path: PathBuf,
    cap: usize,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap,
        }
    }

    /// Store at the default per-user location.
    pub fn default_location(cap: usize) -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("redrix");
        Self {
            path: dir.join("history.json"),
            cap,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<ChatMessage>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write(&self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string(messages)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Append one message, evicting the oldest entries beyond the cap.
    pub fn append(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let mut messages = self.read()?;
        messages.push(message.clone());
        if messages.len() > self.cap {
            let excess = messages.len() - self.cap;
            messages.drain(..excess);
            debug!(evicted = excess, cap = self.cap, "local history cap reached");
        }
        self.write(&messages)
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let messages = self.read()?;
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    /// Every stored message, oldest first.
    pub fn all(&self) -> Result<Vec<ChatMessage>, StoreError> {
        self.read()
    }

    /// Delete all stored messages.
    pub fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
