use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransmitterError {
    #[error("Invalid location: {0}")]
    Location(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] confique::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, TransmitterError>;
