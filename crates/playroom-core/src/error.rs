//! Error types for Playroom

use crate::validate::SyntaxError;
use thiserror::Error;

/// Result type alias using Playroom's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Playroom operations
#[derive(Error, Debug)]
pub enum Error {
    /// Code failed the JSX syntax check
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Formatter rejected the code
    #[error("Format failed: {0}")]
    Format(String),

    /// Preference store read or write failed
    #[error("Store error: {0}")]
    Store(String),

    /// Host code loader failed
    #[error("Code loader failed: {0}")]
    Loader(String),

    /// Secondary window could not be opened
    #[error("Window portal error: {0}")]
    Portal(String),

    /// Operation needs code to be loaded first
    #[error("Playroom is not ready")]
    NotReady,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
