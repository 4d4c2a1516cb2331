use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{AuditEvent, Note, NoteChanges, ShareGrant, User};
use crate::repo::{AuditSink, NoteBackend, UserDirectory};

/// In-memory backend for tests and local development.
///
/// Clones share the same underlying maps. Each operation takes its lock once
/// and never holds it across an await, so check-then-insert sequences (grant
/// creation, user registration) are atomic.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,
    grants: Arc<Mutex<HashMap<(Uuid, Uuid), ShareGrant>>>,
    users: Arc<Mutex<HashMap<Uuid, User>>>,
    audit: Arc<Mutex<Vec<AuditEvent>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of grant rows held, dangling ones included.
    pub fn grant_count(&self) -> usize {
        lock(&self.grants).len()
    }

    /// Every audit event in insertion order.
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        lock(&self.audit).clone()
    }
}

impl NoteBackend for MemoryStore {
    async fn insert_note(&self, note: Note) -> Result<Note, StoreError> {
        lock(&self.notes).insert(note.id, note.clone());
        Ok(note)
    }

    async fn get_note(&self, id: Uuid) -> Result<Note, StoreError> {
        lock(&self.notes).get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_owned_by(&self, owner_id: Uuid) -> Result<Vec<Note>, StoreError> {
        let mut notes: Vec<Note> = lock(&self.notes)
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    async fn list_shared_with(&self, user_id: Uuid) -> Result<Vec<(Note, ShareGrant)>, StoreError> {
        let mut grants: Vec<ShareGrant> = lock(&self.grants)
            .values()
            .filter(|g| g.grantee_id == user_id)
            .cloned()
            .collect();
        grants.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let notes = lock(&self.notes);
        Ok(grants
            .into_iter()
            // Dangling grant: the note was deleted after sharing
            .filter_map(|g| notes.get(&g.note_id).cloned().map(|n| (n, g)))
            .collect())
    }

    async fn update_note(&self, id: Uuid, changes: NoteChanges) -> Result<Note, StoreError> {
        let mut notes = lock(&self.notes);
        let note = notes.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), StoreError> {
        lock(&self.notes)
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn find_grant(
        &self,
        note_id: Uuid,
        grantee_id: Uuid,
    ) -> Result<Option<ShareGrant>, StoreError> {
        Ok(lock(&self.grants).get(&(note_id, grantee_id)).cloned())
    }

    async fn insert_grant(&self, grant: ShareGrant) -> Result<ShareGrant, StoreError> {
        let mut grants = lock(&self.grants);
        let key = (grant.note_id, grant.grantee_id);
        if grants.contains_key(&key) {
            return Err(StoreError::DuplicateGrant);
        }
        grants.insert(key, grant.clone());
        Ok(grant)
    }
}

impl UserDirectory for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = lock(&self.users);
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateUser);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_handle(&self, handle: &str) -> Result<Option<User>, StoreError> {
        let users = lock(&self.users);
        let email = handle.to_lowercase();
        if let Some(user) = users.values().find(|u| u.email == email) {
            return Ok(Some(user.clone()));
        }
        // Oldest account wins when display names collide
        Ok(users
            .values()
            .filter(|u| u.name == handle)
            .min_by_key(|u| u.created_at)
            .cloned())
    }
}

impl AuditSink for MemoryStore {
    async fn append(&self, event: AuditEvent) -> Result<(), StoreError> {
        lock(&self.audit).push(event);
        Ok(())
    }

    async fn list_by_actor(&self, actor_id: Uuid) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(lock(&self.audit)
            .iter()
            .rev()
            .filter(|e| e.actor_id == actor_id)
            .cloned()
            .collect())
    }
}
