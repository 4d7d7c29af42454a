//! Model catalog, chat message types, and the completion client.
//!
//! The catalog is pure lookup — "current model" state lives in the
//! conversation session, not here.

pub mod catalog;
mod client;
mod error;
mod mock;
mod types;

pub use catalog::ModelCatalogEntry;
pub use client::{CompletionBackend, CompletionClient, ProbeOutcome};
pub use error::CompletionError;
pub use mock::{EchoBackend, GatedBackend, RecordedCall, ScriptedBackend};
pub use types::{ChatMessage, CompletionReply, ImageAttachment, Role, UsageInfo};
