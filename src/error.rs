use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Batch could not be read: {0}")]
    Batch(String),
}

pub type Result<T> = std::result::Result<T, GateError>;

/// Failures raised by an object store adapter while fetching bytes.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object {container}/{key} not found")]
    NotFound { container: String, key: String },

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("storage returned status {status} for {container}/{key}")]
    Status {
        status: u16,
        container: String,
        key: String,
    },

    #[error("storage request failed: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised by a notification adapter while delivering an alert.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification channel returned status {0}")]
    Status(u16),

    #[error("notification delivery failed: {0}")]
    Transport(String),

    #[error("notification could not be serialized: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single batch entry that could not be processed.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("malformed event entry: {0}")]
    MalformedEntry(String),
}
