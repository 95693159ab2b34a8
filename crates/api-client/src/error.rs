/// Errors surfaced by the HTTP API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, bad URL).
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Non-success HTTP status with no usable error envelope.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    /// The response body was not the JSON shape we expect.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// The server reported success=false (or an error envelope) with a
    /// human-readable message, optionally with a recovery suggestion.
    #[error("{message}")]
    Business {
        message: String,
        suggestion: Option<String>,
    },
    /// The envelope decoded but carried no data payload.
    #[error("{endpoint} returned an empty data payload")]
    MissingData { endpoint: String },
    /// The request was rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Core(#[from] posyandu_core::ClientError),
}

impl ApiError {
    /// The suggestion text from a business error, if any.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ApiError::Business { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
