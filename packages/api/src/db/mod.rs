//! # Database module — PostgreSQL persistence
//!
//! Entirely gated behind the `server` feature so that the core note logic and its
//! tests build without SQLx.
//!
//! - [`connect`] and [`migrate`] open a pool and apply `packages/api/migrations`.
//! - [`PgStore`] implements [`store::NoteBackend`], [`store::UserDirectory`] and
//!   [`store::AuditSink`] over that pool.

mod pg;
mod pool;

pub use pg::PgStore;
pub use pool::{connect, migrate};
