use std::io;

/// Errors that can occur during jest-runner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Buffer is not visiting a file")]
    NoBackingFile,

    #[error("No enclosing '{keyword}' block found above the cursor")]
    NoTestBlock { keyword: String },

    #[error("No previous test command to rerun")]
    NoPriorCommand,

    #[error("Invalid location pattern: {0}")]
    InvalidPattern(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Errors the user should simply be told about; nothing was launched.
    pub fn is_user_message(&self) -> bool {
        matches!(
            self,
            Error::NoBackingFile | Error::NoTestBlock { .. } | Error::NoPriorCommand
        )
    }
}

/// Result type alias for jest-runner operations
pub type Result<T> = std::result::Result<T, Error>;
