use thiserror::Error;

/// Errors surfaced by any storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("a grant for this note and user already exists")]
    DuplicateGrant,
    #[error("a user with this email already exists")]
    DuplicateUser,
    #[error("storage backend error: {0}")]
    Backend(String),
}
