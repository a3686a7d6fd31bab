use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LyoError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("Cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for LyoError {
    fn from(e: serde_json::Error) -> Self {
        LyoError::Serialization(e.to_string())
    }
}
