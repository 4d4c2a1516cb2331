//! # Server crate: HTTP boundary of the note vault
//!
//! A thin axum layer over the `api` crate. Handlers resolve the caller from the
//! session, call exactly one service method, and map the result through
//! [`error::ApiError`].
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`error`] | `api::Error` → status code + JSON body |
//! | [`routes`] | The `/api` router, session identity, source address extraction |
//! | [`settings`] | Layered configuration (defaults, `config.toml`, `VAULT__*` env) |
//!
//! The router is generic over the storage [`Backend`], so route tests run it over
//! [`store::MemoryStore`] with an in-memory session store.

use std::sync::Arc;

use api::{Accounts, NoteCipher, NoteService};
use store::{AuditSink, NoteBackend, UserDirectory};

pub mod error;
pub mod routes;
pub mod settings;

pub use routes::router;

/// Everything the handlers need from storage.
pub trait Backend:
    NoteBackend + UserDirectory + AuditSink + Clone + Send + Sync + 'static
{
}

impl<T> Backend for T where
    T: NoteBackend + UserDirectory + AuditSink + Clone + Send + Sync + 'static
{
}

pub struct AppState<S> {
    pub notes: Arc<NoteService<S, S>>,
    pub accounts: Arc<Accounts<S, S>>,
    /// See [`settings::Server::trust_forwarded_for`].
    pub trust_forwarded_for: bool,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            notes: Arc::clone(&self.notes),
            accounts: Arc::clone(&self.accounts),
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }
}

impl<S: Backend> AppState<S> {
    /// One backend serves notes, users and the audit log.
    pub fn new(backend: S, cipher: NoteCipher) -> Self {
        Self {
            notes: Arc::new(NoteService::new(backend.clone(), cipher, backend.clone())),
            accounts: Arc::new(Accounts::new(backend.clone(), backend)),
            trust_forwarded_for: false,
        }
    }

    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}
