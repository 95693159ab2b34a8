#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not logged in (no bearer token in session)")]
    MissingToken,
    #[error("failed to read session file: {0}")]
    SessionRead(std::io::Error),
    #[error("failed to write session file: {0}")]
    SessionWrite(std::io::Error),
    #[error("failed to create session directory: {0}")]
    SessionDirCreation(std::io::Error),
    #[error("failed to serialize session: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize session: {0}")]
    Deserialization(serde_json::Error),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
