use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectorError>;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Unknown request type: {0}")]
    UnknownRequestType(String),

    #[error("No shards available in snapshot")]
    NoShardsAvailable,

    #[error("Acquisition failed for dimension '{dimension}': {reason}")]
    Acquisition { dimension: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
