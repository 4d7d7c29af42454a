// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Remote document store client (Data API wire format).
//!
//! Every operation is an HTTP POST to `{base_url}/action/{verb}` with the
//! `api-key` header and a JSON body naming `dataSource`, `database`, and
//! `collection` plus the verb's own fields.  A 2xx status means success;
//! `find` replies `{ "documents": [...] }`.

use serde_json::{json, Value};
use tracing::debug;

use redrix_config::StoreConfig;
use redrix_model::ChatMessage;

use crate::StoreError;

pub struct RemoteStore {
    api_key: String,
    base_url: String,
    data_source: String,
    database: String,
    collection: String,
    client: reqwest::Client,
}

impl RemoteStore {
    /// Build a client from a connection descriptor.  Returns `None` when the
    /// descriptor is incomplete — the caller then runs local-only.
    pub fn from_config(cfg: &StoreConfig) -> Option<Self> {
        if !cfg.is_complete() {
            return None;
        }
        Some(Self {
            api_key: cfg.api_key.clone()?,
            base_url: cfg.base_url.clone()?.trim_end_matches('/').to_string(),
            data_source: cfg.data_source.clone(),
            database: cfg.database.clone(),
            collection: cfg.collection.clone(),
            client: reqwest::Client::new(),
        })
    }

    /// POST one action; merge the scoping fields into `extra`.
    async fn action(&self, verb: &str, extra: Value) -> Result<Value, StoreError> {
        let mut body = json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": self.collection,
        });
        if let (Some(dst), Some(src)) = (body.as_object_mut(), extra.as_object()) {
            for (k, v) in src {
                dst.insert(k.clone(), v.clone());
            }
        }

        let url = format!("{}/action/{verb}", self.base_url);
        debug!(%verb, "remote store request");

        let resp = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => StoreError::Auth(detail),
                code => StoreError::Request {
                    status: code,
                    detail,
                },
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    /// Lightweight existence probe used for authentication.
    pub async fn probe(&self) -> Result<(), StoreError> {
        self.action("findOne", json!({ "filter": { "_id": "test" } }))
            .await
            .map(|_| ())
    }

    /// Append one message document.
    pub async fn insert(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let document =
            serde_json::to_value(message).map_err(|e| StoreError::Malformed(e.to_string()))?;
        self.action("insertOne", json!({ "document": document }))
            .await
            .map(|_| ())
    }

    fn parse_documents(body: Value) -> Result<Vec<ChatMessage>, StoreError> {
        let docs = body
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::Malformed("missing documents array".into()))?;
        docs.iter()
            .map(|d| {
                serde_json::from_value(d.clone()).map_err(|e| StoreError::Malformed(e.to_string()))
            })
            .collect()
    }

    /// The most recent `limit` messages, returned oldest first.
    pub async fn find_recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let body = self
            .action(
                "find",
                json!({ "sort": { "timestamp": -1 }, "limit": limit }),
            )
            .await?;
        let mut messages = Self::parse_documents(body)?;
        // The query sorts newest-first to apply the limit; flip back to
        // chronological order for callers.
        messages.reverse();
        Ok(messages)
    }

    /// Every stored message, oldest first.
    pub async fn find_all(&self) -> Result<Vec<ChatMessage>, StoreError> {
        let body = self
            .action("find", json!({ "sort": { "timestamp": 1 } }))
            .await?;
        Self::parse_documents(body)
    }

    /// Delete every message in the collection.
    pub async fn delete_all(&self) -> Result<(), StoreError> {
        self.action("deleteMany", json!({ "filter": {} }))
            .await
            .map(|_| ())
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
