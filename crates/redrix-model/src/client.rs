// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Completion client for OpenAI-compatible chat completion APIs.
//!
//! Translates conversation state into a single non-streaming request and
//! normalizes the result.  Request shaping: one system instruction, at most
//! the last [`HISTORY_WINDOW`] history entries oldest-first, then the new
//! user turn (a text + image part list when attachments are present).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use redrix_config::LlmConfig;

use crate::{
    catalog::ModelCatalogEntry, ChatMessage, CompletionError, CompletionReply, ImageAttachment,
    UsageInfo,
};

/// System instruction prepended to every request unless overridden in config.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide clear, accurate, and engaging responses.";

/// Number of trailing history messages included in each request.
const HISTORY_WINDOW: usize = 10;

/// Abstraction over the completion call so the session can be driven by
/// scripted mocks in tests.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        images: &[ImageAttachment],
        model: &ModelCatalogEntry,
    ) -> Result<CompletionReply, CompletionError>;
}

/// Result of a connection probe.  Never an `Err` — failure is data here.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub success: bool,
    pub response: Option<String>,
    pub error: Option<String>,
}

pub struct CompletionClient {
    api_key: Option<String>,
    chat_url: String,
    system_prompt: String,
    temperature: f64,
    max_tokens: u32,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(
        api_key: Option<String>,
        chat_url: impl Into<String>,
        system_prompt: Option<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            api_key,
            chat_url: chat_url.into(),
            system_prompt: system_prompt.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature,
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    /// Construct from configuration, resolving the API key from the explicit
    /// field or the named environment variable.
    pub fn from_config(cfg: &LlmConfig) -> Self {
        Self::new(
            cfg.resolve_api_key(),
            cfg.base_url.clone(),
            cfg.system_prompt.clone(),
            cfg.temperature,
            cfg.max_tokens,
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a minimal probe message.  Captures success or failure in the
    /// returned outcome instead of propagating.
    pub async fn test_connection(&self, model: &ModelCatalogEntry) -> ProbeOutcome {
        match self.complete("Hello", &[], &[], model).await {
            Ok(reply) => ProbeOutcome {
                success: true,
                response: Some(reply.content),
                error: None,
            },
            Err(e) => ProbeOutcome {
                success: false,
                response: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn complete(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        images: &[ImageAttachment],
        model: &ModelCatalogEntry,
    ) -> Result<CompletionReply, CompletionError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        // The caller must not silently lose attachments: reject before any
        // network I/O when the model cannot accept them.
        if !images.is_empty() && !model.supports_images {
            return Err(CompletionError::UnsupportedModality {
                model: model.display_name.clone(),
            });
        }

        let messages = build_messages(&self.system_prompt, prompt, history, images);

        debug!(
            model = %model.id,
            message_count = messages.len(),
            has_images = !images.is_empty(),
            "sending completion request"
        );

        let body = json!({
            "model": model.id,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        let resp = self
            .client
            .post(&self.chat_url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| status.to_string());

            return Err(match status.as_u16() {
                401 => CompletionError::InvalidApiKey,
                400 => CompletionError::BadRequest(detail),
                code => CompletionError::RequestFailed {
                    status: code,
                    detail,
                },
            });
        }

        let data: Value = resp.json().await?;
        let content = data
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or(CompletionError::MalformedResponse)?;

        let usage: Option<UsageInfo> = data
            .get("usage")
            .filter(|u| !u.is_null())
            .and_then(|u| serde_json::from_value(u.clone()).ok());

        Ok(CompletionReply {
            content: content.to_string(),
            model: model.id.clone(),
            usage,
        })
    }
}

/// Build the `messages` array: system instruction, trailing history window
/// oldest-first, then the new user turn.
fn build_messages(
    system_prompt: &str,
    prompt: &str,
    history: &[ChatMessage],
    images: &[ImageAttachment],
) -> Vec<Value> {
    let mut messages = vec![json!({ "role": "system", "content": system_prompt })];

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for m in &history[start..] {
        messages.push(json!({ "role": m.role.as_str(), "content": m.content }));
    }

    let user_turn = if images.is_empty() {
        json!({ "role": "user", "content": prompt })
    } else {
        let mut parts = vec![json!({ "type": "text", "text": prompt })];
        parts.extend(
            images
                .iter()
                .map(|img| json!({ "type": "image_url", "image_url": { "url": img.data_url } })),
        );
        json!({ "role": "user", "content": parts })
    };
    messages.push(user_turn);

    messages
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
