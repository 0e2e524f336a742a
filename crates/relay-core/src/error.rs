use thiserror::Error;

/// Top-level error type for Relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Error from the messaging transport.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from the coding-agent subprocess.
    #[error("agent error: {0}")]
    Agent(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Screenshot pipeline error (server, browser, target discovery).
    #[error("capture error: {0}")]
    Capture(String),

    /// Single-instance lock error.
    #[error("lock error: {0}")]
    Lock(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
