//! # Note service: the single entry point for note operations
//!
//! [`NoteService`] composes the [`policy`](super::policy) checks with the
//! [`NoteStore`] and the [`AuditTrail`]. Every business rule about who may do what
//! to a note is enforced here and nowhere else.
//!
//! ## Check order
//!
//! Each operation on an existing note runs the same pipeline:
//!
//! 1. validate inputs that do not depend on the note (share permission, handle);
//! 2. load the note → [`Error::NotFound`];
//! 3. ask the policy → [`Error::Forbidden`];
//! 4. validate inputs that only an authorised caller should learn about;
//! 5. mutate through the store, decrypt for the response;
//! 6. record the audit event (best-effort, only on success).
//!
//! ## Audit events
//!
//! | Operation | Event | When |
//! |-----------|-------|------|
//! | [`create`](NoteService::create) | `CREATE_NOTE` | always |
//! | [`read`](NoteService::read) | `READ_NOTE` | only when the reader is not the owner |
//! | [`update`](NoteService::update) | `UPDATE_NOTE` | always |
//! | [`delete`](NoteService::delete) | `DELETE_NOTE` | always |
//! | [`share`](NoteService::share) | `SHARE_NOTE` | always |
//!
//! Listing operations are not audited.

use std::str::FromStr;

use store::{AuditAction, AuditSink, Note, NoteBackend, Permission, ShareGrant, UserDirectory};
use uuid::Uuid;

use super::policy::{self, Identity};
use super::store::{DecryptedNote, NoteStore};
use crate::audit::AuditTrail;
use crate::crypto::NoteCipher;
use crate::error::{Error, Result};
use crate::models::{NoteView, ShareInfo};

/// An authenticated identity plus the network address the request came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub identity: Identity,
    pub source_addr: Option<String>,
}

impl Caller {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            source_addr: None,
        }
    }

    pub fn with_source(mut self, addr: impl Into<String>) -> Self {
        self.source_addr = Some(addr.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.identity.id
    }
}

pub struct NoteService<B, A> {
    notes: NoteStore<B>,
    audit: AuditTrail<A>,
}

impl<B, A> NoteService<B, A>
where
    B: NoteBackend + UserDirectory,
    A: AuditSink,
{
    pub fn new(backend: B, cipher: NoteCipher, audit: A) -> Self {
        Self {
            notes: NoteStore::new(backend, cipher),
            audit: AuditTrail::new(audit),
        }
    }

    pub fn audit(&self) -> &AuditTrail<A> {
        &self.audit
    }

    pub async fn create(&self, caller: &Caller, title: &str, content: &str) -> Result<NoteView> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(Error::invalid("Title and content are required"));
        }

        let note = self.notes.create(caller.id(), title, content).await?;
        tracing::debug!(note_id = %note.id, owner = %caller.id(), "Created note");

        self.record(caller, AuditAction::CreateNote, note.id).await;
        Ok(NoteView::owned(note))
    }

    pub async fn read(&self, note_id: Uuid, caller: &Caller) -> Result<NoteView> {
        let note = self.notes.get(note_id).await?;
        let grant = self.grant_for(&note, caller).await?;

        if !policy::can_read(&note, &caller.identity, grant.as_ref()) {
            return Err(Error::Forbidden);
        }

        let decrypted = self.notes.decrypt(&note)?;
        if grant.is_some() {
            self.record(caller, AuditAction::ReadNote, note_id).await;
        }
        Ok(view(decrypted, grant.as_ref()))
    }

    /// Partial update. `None` leaves a field as it is; a supplied value must not be blank.
    pub async fn update(
        &self,
        note_id: Uuid,
        caller: &Caller,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<NoteView> {
        let note = self.notes.get(note_id).await?;
        let grant = self.grant_for(&note, caller).await?;

        if !policy::can_write(&note, &caller.identity, grant.as_ref()) {
            return Err(Error::Forbidden);
        }
        if title.as_deref().is_some_and(|t| t.trim().is_empty())
            || content.as_deref().is_some_and(|c| c.trim().is_empty())
        {
            return Err(Error::invalid("Title and content cannot be blank"));
        }

        let updated = self
            .notes
            .update(note_id, title, content.as_deref())
            .await?;
        let decrypted = self.notes.decrypt(&updated)?;

        self.record(caller, AuditAction::UpdateNote, note_id).await;
        Ok(view(decrypted, grant.as_ref()))
    }

    pub async fn delete(&self, note_id: Uuid, caller: &Caller) -> Result<()> {
        let note = self.notes.get(note_id).await?;

        if !policy::can_delete(&note, &caller.identity) {
            return Err(Error::Forbidden);
        }

        self.notes.delete(note_id).await?;
        tracing::debug!(%note_id, by = %caller.id(), admin = caller.identity.is_admin(), "Deleted note");

        self.record(caller, AuditAction::DeleteNote, note_id).await;
        Ok(())
    }

    /// Grant `grantee` (email or display name) `permission` on a note the caller owns.
    pub async fn share(
        &self,
        note_id: Uuid,
        caller: &Caller,
        grantee: &str,
        permission: &str,
    ) -> Result<ShareInfo> {
        let permission = Permission::from_str(permission)
            .map_err(|_| Error::invalid("Invalid permission. Must be READ or WRITE"))?;
        let grantee = grantee.trim();
        if grantee.is_empty() {
            return Err(Error::invalid("A username or email is required"));
        }

        let note = self.notes.get(note_id).await?;
        if !policy::can_share(&note, &caller.identity) {
            return Err(Error::Forbidden);
        }

        let user = self
            .notes
            .backend()
            .find_user_by_handle(grantee)
            .await?
            .ok_or(Error::UserNotFound)?;
        if note.is_owned_by(user.id) {
            return Err(Error::invalid("You already own this note"));
        }

        let grant = self.notes.create_grant(note_id, user.id, permission).await?;
        tracing::debug!(%note_id, grantee = %user.id, %permission, "Shared note");

        self.record(caller, AuditAction::ShareNote, note_id).await;
        Ok(ShareInfo {
            note_id,
            grantee_id: user.id,
            grantee_name: user.name,
            permission: grant.permission,
            shared_at: grant.created_at,
        })
    }

    pub async fn list_owned(&self, caller: &Caller) -> Result<Vec<NoteView>> {
        self.notes
            .list_owned_by(caller.id())
            .await?
            .iter()
            .map(|note| -> Result<NoteView> { Ok(NoteView::owned(self.notes.decrypt(note)?)) })
            .collect()
    }

    /// Notes shared with the caller. Grants whose note has been deleted are skipped.
    pub async fn list_shared(&self, caller: &Caller) -> Result<Vec<NoteView>> {
        self.notes
            .list_shared_with(caller.id())
            .await?
            .iter()
            .map(|(note, grant)| -> Result<NoteView> {
                Ok(NoteView::shared(self.notes.decrypt(note)?, grant))
            })
            .collect()
    }

    /// The caller's grant on `note`, or `None` for the owner.
    async fn grant_for(&self, note: &Note, caller: &Caller) -> Result<Option<ShareGrant>> {
        if note.is_owned_by(caller.id()) {
            return Ok(None);
        }
        self.notes.find_grant(note.id, caller.id()).await
    }

    async fn record(&self, caller: &Caller, action: AuditAction, note_id: Uuid) {
        self.audit
            .record(
                caller.id(),
                action,
                note_id.to_string(),
                caller.source_addr.as_deref(),
            )
            .await;
    }
}

fn view(note: DecryptedNote, grant: Option<&ShareGrant>) -> NoteView {
    match grant {
        Some(grant) => NoteView::shared(note, grant),
        None => NoteView::owned(note),
    }
}
