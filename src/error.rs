use std::path::PathBuf;

use thiserror::Error;

use crate::attributes::PatternError;

#[derive(Error, Debug)]
pub enum GitCryptError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Repository is already (at least partially) initialized, check {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Repository is not initialized")]
    NotInitialized,

    #[error("Malformed pattern in {}:{line}: {source}", file.display())]
    MalformedPattern {
        file: PathBuf,
        line: usize,
        #[source]
        source: PatternError,
    },

    #[error("Malformed recipient {recipient:?}: {reason}")]
    MalformedRecipient { recipient: String, reason: String },

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("No identity found at {}", .0.display())]
    MissingIdentity(PathBuf),

    #[error("Invalid identity {}: {reason}", path.display())]
    InvalidIdentity { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Path {} is outside the repository", .0.display())]
    PathOutsideRepo(PathBuf),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GitCryptError>;
