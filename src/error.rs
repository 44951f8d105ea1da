use thiserror::Error;

/// Errors that can occur while navigating panels or reading content
#[derive(Error, Debug)]
pub enum NavError {
    #[error("Entry does not belong to either panel: {path}")]
    EntryNotFound { path: String },

    #[error("No files selected!")]
    NoFilesSelected,

    #[error("Failed to fetch {path}: {message}")]
    Fetch { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NavError {
    /// Shorthand used by collaborators reporting a failed remote read
    pub fn fetch(path: impl Into<String>, message: impl Into<String>) -> Self {
        NavError::Fetch {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for navigation operations
pub type Result<T> = std::result::Result<T, NavError>;
