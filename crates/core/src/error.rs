//! Error types for the tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Invalid configuration (implausible vocabulary, bad run bound, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed vocabulary or merge resource
    #[error("Load error: {0}")]
    Load(String),

    /// A required resource file could not be read
    #[error("Missing resource {path}: {err}")]
    MissingResource {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pre-tokenization pattern failed to compile or to match
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Token ID with no entry in the reverse vocabulary
    #[error("Invalid token ID: {0}")]
    InvalidToken(u32),

    /// Character outside the byte-level alphabet
    #[error("Unmapped symbol: {0:?}")]
    UnmappedSymbol(char),

    /// Merged symbol with no vocabulary entry
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Decoded bytes are not valid UTF-8
    #[error("Decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

impl TokenizerError {
    /// Whether this error can only be raised while building a tokenizer.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::Load(_)
                | Self::MissingResource { .. }
                | Self::Json(_)
                | Self::Pattern(_)
        )
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
