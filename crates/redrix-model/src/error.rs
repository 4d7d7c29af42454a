use thiserror::Error;

/// Errors from the completion client.
///
/// None of these degrade silently: every variant reaches the conversation
/// session, which renders it as a visible transcript entry.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no API key configured; set llm.api_key or llm.api_key_env")]
    MissingApiKey,

    #[error("invalid API key; the server rejected the credential")]
    InvalidApiKey,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request failed with status {status}: {detail}")]
    RequestFailed { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response format: no completion choice with a message body")]
    MalformedResponse,

    #[error("model {model} does not support images; switch to a vision model")]
    UnsupportedModality { model: String },
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        CompletionError::Transport(e.to_string())
    }
}
