//! Configuration and credential handling for redrix.
//!
//! Layered TOML configuration (system → user → workspace → explicit path)
//! plus a small credential-store abstraction so the core never talks to the
//! host environment directly.

mod credentials;
mod loader;
mod schema;

pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, KEY_LLM_API,
    KEY_STORE_DESCRIPTOR,
};
pub use loader::load;
pub use schema::{Config, HistoryConfig, LlmConfig, StoreConfig};
