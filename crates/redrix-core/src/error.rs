use thiserror::Error;

use redrix_store::StoreError;

/// Errors surfaced by the conversation session.
///
/// Completion failures never appear here — the session converts them into
/// visible transcript entries instead of propagating.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
