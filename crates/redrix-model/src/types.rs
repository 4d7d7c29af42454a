// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Message types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used in completion request bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One persisted message in the conversation history.
///
/// The same shape is stored remotely, mirrored to the local fallback, and
/// rendered in transcript exports.  Messages are append-only and never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Model that produced (assistant) or was active for (user) this message.
    pub model: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Stamp a fresh message with a unique id and the current time.
    pub fn new(role: Role, content: impl Into<String>, model: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            model,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>, model: Option<String>) -> Self {
        Self::new(Role::User, content, model)
    }

    pub fn assistant(content: impl Into<String>, model: Option<String>) -> Self {
        Self::new(Role::Assistant, content, model)
    }
}

/// An image attached to an outgoing user turn.
///
/// `data_url` is `data:<mime>;base64,<b64>` — the form the completion API
/// accepts directly as an `image_url` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub name: String,
    pub data_url: String,
}

impl ImageAttachment {
    pub fn new(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_url: data_url.into(),
        }
    }
}

// ─── Completion results ──────────────────────────────────────────────────────

/// Token usage as reported by the completion API, when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Normalized reply from one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReply {
    pub content: String,
    /// Id of the model that served the request.
    pub model: String,
    pub usage: Option<UsageInfo>,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
