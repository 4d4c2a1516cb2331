//! # API crate — business logic for the note vault
//!
//! This crate is the backbone of the vault. It owns every rule about who may do
//! what to a note, and it is the only place plaintext note bodies exist. The HTTP
//! server in `packages/server` is a thin adapter over the types exported here.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`audit`] | — | Best-effort audit trail over a [`store::AuditSink`] |
//! | [`auth`] | — | Local accounts (register, log in), Argon2 password hashing, session key |
//! | [`crypto`] | — | AES-256-GCM encryption of note bodies under the master key |
//! | [`db`] | `server` | PostgreSQL pool, migrations and the [`db::PgStore`] backend |
//! | [`error`] | — | The [`Error`] taxonomy every operation returns |
//! | [`models`] | — | Client-safe projections (`NoteView`, `ShareInfo`, `UserInfo`) |
//! | [`notes`] | — | Access policy, encrypted note store, and the [`NoteService`] |
//!
//! ## Backends
//!
//! Everything except [`db`] is generic over the storage traits from the `store`
//! crate, so the same service runs against PostgreSQL in production and against
//! [`store::MemoryStore`] in tests.

pub mod audit;
pub mod auth;
pub mod crypto;
#[cfg(feature = "server")]
pub mod db;
pub mod error;
pub mod models;
pub mod notes;

pub use auth::Accounts;
pub use crypto::NoteCipher;
pub use error::{Error, Result};
pub use models::{NoteView, ShareInfo, UserInfo};
pub use notes::{Caller, Identity, NoteService};
