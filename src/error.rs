use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccrualError {
    #[error("invalid period pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("date conversion failed: {0}")]
    DateError(String),

    #[error("status derivation failed: {0}")]
    StatusError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AccrualError>;
