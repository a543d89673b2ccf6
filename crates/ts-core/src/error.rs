use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("No models available for routing")]
    NoModelsAvailable,
    #[error("Invalid model descriptor {id}: {reason}")]
    InvalidModel { id: String, reason: String },
    #[error("Duplicate model id: {0}")]
    DuplicateModel(String),
    #[error("No adapter registered for provider: {0}")]
    AdapterMissing(String),
    #[error("Model {model_id} timed out after {timeout_ms}ms")]
    Timeout { model_id: String, timeout_ms: u64 },
    #[error("Provider error from {model_id}: {message}")]
    Provider { model_id: String, message: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RouterError>;
