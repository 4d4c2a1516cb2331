//! Error taxonomy shared by the note service and the accounts module.
//!
//! Lower layers convert in through `From`: storage conflicts become the
//! user-facing conflict variants, and any crypto failure on the read path becomes
//! [`Error::DecryptionFailed`], which the HTTP boundary reports as a bare 500.

use store::StoreError;
use thiserror::Error;

use crate::crypto::CryptoError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed input the caller can fix.
    #[error("{0}")]
    InvalidInput(String),
    #[error("note not found")]
    NotFound,
    /// Authenticated, but the access policy said no.
    #[error("you don't have permission to do that")]
    Forbidden,
    #[error("this note is already shared with this user")]
    AlreadyShared,
    #[error("user not found")]
    UserNotFound,
    /// No session, stale session, or bad credentials.
    #[error("{0}")]
    Unauthorized(String),
    #[error("stored note could not be decrypted")]
    DecryptionFailed,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Error::NotFound,
            StoreError::DuplicateGrant => Error::AlreadyShared,
            StoreError::DuplicateUser => {
                Error::invalid("An account with this email already exists")
            }
            StoreError::Backend(msg) => Error::Unexpected(msg),
        }
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::DecryptionFailed => Error::DecryptionFailed,
            other => Error::Unexpected(other.to_string()),
        }
    }
}
