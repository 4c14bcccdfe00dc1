//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing or empty in user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The persistence medium rejected a write
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The attachment picker failed for a reason other than cancellation
    #[error("Attachment error: {0}")]
    Attachment(String),
}

impl Error {
    /// Whether this error should be shown to the user as a correctable input problem
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
