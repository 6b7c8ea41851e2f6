//! Error taxonomy for registry operations.
//!
//! Mutating operations surface four failure families: a skill that does not
//! exist, input rejected before any write, a definition file whose header
//! cannot be located where exact boundaries are required, and underlying
//! I/O or serialization failures. Read paths deliberately avoid most of
//! these: malformed optional data degrades to defaults with a logged
//! warning instead of an error.

use {std::path::PathBuf, thiserror::Error};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The named skill (or its definition file) is absent.
    #[error("skill '{0}' does not exist")]
    NotFound(String),

    /// A create collided with an existing skill directory.
    #[error("skill '{0}' already exists")]
    AlreadyExists(String),

    /// Input rejected before any filesystem write.
    #[error("{0}")]
    Validation(String),

    /// The header delimiters are missing or unparseable in a context that
    /// must rewrite the header in place.
    #[error("malformed header in {}: {reason}", path.display())]
    MalformedHeader { path: PathBuf, reason: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
