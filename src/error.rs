use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the library.
///
/// Only the key-store persist/load path swallows failures (it logs them and
/// returns `None`); every other operation surfaces one of these directly.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cryptographic failure: {0}")]
    Cryptographic(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CryptoError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CryptoError::InvalidArgument(msg.into())
    }

    pub(crate) fn crypto(msg: impl Into<String>) -> Self {
        CryptoError::Cryptographic(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
