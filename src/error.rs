use http::Method;
use thiserror::Error;

/// Errors that can occur while handling a single webhook invocation.
///
/// Everything except [`AdapterError::UnsupportedMethod`] fails the invocation.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("malformed webhook payload: {0}")]
    MalformedInput(String),
    #[error("failed to convert event field: {reason}")]
    FieldConversion { reason: String },
    #[error("failed to serialize HEC record: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("HEC request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unsupported method {0}")]
    UnsupportedMethod(Method),
}

impl AdapterError {
    pub(crate) fn malformed(e: impl std::fmt::Display) -> Self {
        AdapterError::MalformedInput(e.to_string())
    }
}
