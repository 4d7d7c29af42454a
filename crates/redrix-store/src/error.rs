use thiserror::Error;

/// Errors from the storage layer.
///
/// Remote variants (`Auth`, `Transport`, `Request`, `Malformed`) are absorbed
/// by the coordinator, which degrades to the local fallback.  Only `Storage`
/// — a local read/write failure — propagates to callers, since it has no
/// further fallback.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote store authentication failed: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote store request failed with status {status}: {detail}")]
    Request { status: u16, detail: String },

    #[error("malformed remote response: {0}")]
    Malformed(String),

    #[error("local storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}
