//! # Storage backend traits
//!
//! The vault's persistence is split into three narrow async traits so that the
//! same business logic in the `api` crate runs against PostgreSQL in production
//! and against [`crate::MemoryStore`] in tests.
//!
//! | Trait | Owns |
//! |-------|------|
//! | [`NoteBackend`] | [`Note`] and [`ShareGrant`] records. Content is already ciphertext by the time it arrives here. |
//! | [`UserDirectory`] | [`User`] accounts and handle resolution for sharing. |
//! | [`AuditSink`] | The append-only [`AuditEvent`] log. |
//!
//! Every returned future is `Send` so handlers built on top can run on a
//! multi-threaded runtime.
//!
//! ## Contracts shared by all backends
//!
//! - [`NoteBackend::insert_grant`] is an atomic insert-if-absent: two racing calls
//!   for the same `(note_id, grantee_id)` pair yield exactly one `Ok` and one
//!   [`StoreError::DuplicateGrant`].
//! - [`NoteBackend::delete_note`] removes only the note. Grants pointing at it are
//!   left dangling, and [`NoteBackend::list_shared_with`] must skip them.
//! - [`NoteBackend::list_owned_by`] orders by `updated_at` and
//!   [`NoteBackend::list_shared_with`] by grant `created_at`, newest first.
//! - [`NoteBackend::update_note`] treats `None` fields as "unchanged" and always
//!   advances `updated_at`.

use std::future::Future;

use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{AuditEvent, Note, NoteChanges, ShareGrant, User};

/// Persistence for notes and their share grants.
pub trait NoteBackend {
    fn insert_note(&self, note: Note) -> impl Future<Output = Result<Note, StoreError>> + Send;

    /// Fails with [`StoreError::NotFound`] when no note has this id.
    fn get_note(&self, id: Uuid) -> impl Future<Output = Result<Note, StoreError>> + Send;

    fn list_owned_by(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Note>, StoreError>> + Send;

    /// Notes shared with `user_id`, paired with the grant, most recently shared
    /// first. Grants whose note no longer exists are skipped.
    fn list_shared_with(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<(Note, ShareGrant)>, StoreError>> + Send;

    fn update_note(
        &self,
        id: Uuid,
        changes: NoteChanges,
    ) -> impl Future<Output = Result<Note, StoreError>> + Send;

    fn delete_note(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn find_grant(
        &self,
        note_id: Uuid,
        grantee_id: Uuid,
    ) -> impl Future<Output = Result<Option<ShareGrant>, StoreError>> + Send;

    /// Insert-if-absent keyed on `(note_id, grantee_id)`.
    fn insert_grant(
        &self,
        grant: ShareGrant,
    ) -> impl Future<Output = Result<ShareGrant, StoreError>> + Send;
}

/// Account storage, owned by the identity side of the system.
pub trait UserDirectory {
    /// Fails with [`StoreError::DuplicateUser`] if the email is taken.
    fn insert_user(&self, user: User) -> impl Future<Output = Result<User, StoreError>> + Send;

    fn find_user(&self, id: Uuid) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Resolve a share target by exact email (case-insensitive) or display name.
    /// An email match wins over a name match.
    fn find_user_by_handle(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}

/// Append-only audit log.
pub trait AuditSink {
    fn append(&self, event: AuditEvent) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Events recorded for `actor_id`, newest first.
    fn list_by_actor(
        &self,
        actor_id: Uuid,
    ) -> impl Future<Output = Result<Vec<AuditEvent>, StoreError>> + Send;
}
