// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The persistence coordinator: decides which backend serves each request.
//!
//! Connection state is settled once per session: credentials are either
//! absent/incomplete (local backend), or an authentication probe succeeds
//! (remote backend) or fails (local backend, terminal — a fresh `connect` is
//! the only path back).  A remote failure during an individual operation
//! degrades that one call to the local path without changing the state.

use tracing::{debug, info, warn};

use redrix_config::{HistoryConfig, StoreConfig};
use redrix_model::{ChatMessage, Role};

use crate::{LocalStore, RemoteStore, StoreError};

/// The storage destination currently serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Remote,
    Local,
}

/// Result of an explicit connection probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub ok: bool,
    pub detail: String,
}

pub struct StoreCoordinator {
    remote: Option<RemoteStore>,
    local: LocalStore,
    connected: bool,
}

impl StoreCoordinator {
    /// Build the coordinator from configuration and authenticate against the
    /// remote store when a complete descriptor is present.
    pub async fn connect(store_cfg: &StoreConfig, history_cfg: &HistoryConfig) -> Self {
        let local = match &history_cfg.local_path {
            Some(p) => LocalStore::new(p, history_cfg.local_cap),
            None => LocalStore::default_location(history_cfg.local_cap),
        };
        Self::connect_with_local(store_cfg, local).await
    }

    /// Like [`connect`](Self::connect), with an explicit local store.
    pub async fn connect_with_local(store_cfg: &StoreConfig, local: LocalStore) -> Self {
        let Some(remote) = RemoteStore::from_config(store_cfg) else {
            debug!("store config incomplete, using local storage");
            return Self {
                remote: None,
                local,
                connected: false,
            };
        };

        match remote.probe().await {
            Ok(()) => {
                info!("remote store authentication successful");
                Self {
                    remote: Some(remote),
                    local,
                    connected: true,
                }
            }
            Err(e) => {
                warn!(error = %e, "remote store authentication failed, using local storage");
                Self {
                    remote: Some(remote),
                    local,
                    connected: false,
                }
            }
        }
    }

    /// A coordinator that never touches the network.
    pub fn local_only(local: LocalStore) -> Self {
        Self {
            remote: None,
            local,
            connected: false,
        }
    }

    pub fn backend(&self) -> Backend {
        if self.connected {
            Backend::Remote
        } else {
            Backend::Local
        }
    }

    fn remote(&self) -> Option<&RemoteStore> {
        if self.connected {
            self.remote.as_ref()
        } else {
            None
        }
    }

    /// Append a message to history.  Stamps id and timestamp.
    ///
    /// Remote failures degrade to the local store for this call only; a local
    /// write failure is the only error surfaced.
    pub async fn save(
        &self,
        role: Role,
        content: impl Into<String>,
        model: Option<String>,
    ) -> Result<ChatMessage, StoreError> {
        let message = ChatMessage::new(role, content, model);

        if let Some(remote) = self.remote() {
            match remote.insert(&message).await {
                Ok(()) => return Ok(message),
                Err(e) => {
                    warn!(error = %e, "remote save failed, falling back to local storage");
                }
            }
        }

        self.local.append(&message)?;
        Ok(message)
    }

    /// The most recent `limit` messages, oldest first.
    pub async fn fetch_history(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        if let Some(remote) = self.remote() {
            match remote.find_recent(limit).await {
                Ok(messages) => return Ok(messages),
                Err(e) => {
                    warn!(error = %e, "remote history read failed, falling back to local storage");
                }
            }
        }
        self.local.recent(limit)
    }

    /// Unlimited read for transcript export.
    pub async fn fetch_all_for_export(&self) -> Result<Vec<ChatMessage>, StoreError> {
        if let Some(remote) = self.remote() {
            match remote.find_all().await {
                Ok(messages) => return Ok(messages),
                Err(e) => {
                    warn!(error = %e, "remote export read failed, falling back to local storage");
                }
            }
        }
        self.local.all()
    }

    /// Delete all messages in the active backend.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        if let Some(remote) = self.remote() {
            match remote.delete_all().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, "remote clear failed, clearing local storage instead");
                }
            }
        }
        self.local.clear()
    }

    /// Non-mutating probe.  Unlike every other operation this surfaces remote
    /// failure explicitly and never falls back.
    pub async fn test_connection(&self) -> ProbeReport {
        let Some(remote) = self.remote() else {
            return ProbeReport {
                ok: false,
                detail: "not connected to the remote store".into(),
            };
        };
        match remote.probe().await {
            Ok(()) => ProbeReport {
                ok: true,
                detail: "remote store reachable".into(),
            },
            Err(e) => ProbeReport {
                ok: false,
                detail: e.to_string(),
            },
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
