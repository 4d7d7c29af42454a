// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Completion API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Explicit API key; prefer api_key_env in config files to avoid secrets
    /// in version-controlled files
    pub api_key: Option<String>,
    /// Environment variable that holds the API key (read at runtime)
    pub api_key_env: Option<String>,
    /// Full chat completions URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// System instruction override; leave None to use the built-in prompt
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens to request in a single completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_max_tokens() -> u32 {
    3000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            base_url: default_base_url(),
            system_prompt: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: explicit value first, then the named env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            return Some(k.clone());
        }
        if let Some(env) = &self.api_key_env {
            return std::env::var(env).ok();
        }
        None
    }
}

/// Remote document store connection descriptor.
///
/// All credential fields are optional: an incomplete descriptor simply means
/// the local fallback serves every request for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data API application id
    pub app_id: Option<String>,
    /// Data API key, sent as the `api-key` header
    pub api_key: Option<String>,
    /// Data API base URL, up to but not including `/action/<verb>`
    pub base_url: Option<String>,
    /// Cluster name forwarded as `dataSource` in every request body
    #[serde(default = "default_data_source")]
    pub data_source: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_data_source() -> String {
    "Cluster0".into()
}
fn default_database() -> String {
    "chatMemory".into()
}
fn default_collection() -> String {
    "conversations".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            api_key: None,
            base_url: None,
            data_source: default_data_source(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

impl StoreConfig {
    /// A descriptor is usable only when all three credential fields are set.
    pub fn is_complete(&self) -> bool {
        self.app_id.is_some() && self.api_key.is_some() && self.base_url.is_some()
    }
}

/// Conversation history limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of prior messages included in each completion request
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,
    /// Maximum messages retained by the local fallback store (FIFO eviction)
    #[serde(default = "default_local_cap")]
    pub local_cap: usize,
    /// Local fallback file override (default: `<data_dir>/redrix/history.json`)
    #[serde(default)]
    pub local_path: Option<String>,
}

fn default_context_messages() -> usize {
    10
}
fn default_local_cap() -> usize {
    1000
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            context_messages: default_context_messages(),
            local_cap: default_local_cap(),
            local_path: None,
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
