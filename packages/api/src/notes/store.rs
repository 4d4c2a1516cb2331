//! # Note store: encryption at rest over a [`NoteBackend`]
//!
//! [`NoteStore`] is the only place note bodies cross between plaintext and
//! ciphertext. Writes encrypt before they reach the backend; reads hand back the
//! stored (ciphertext) [`Note`] and callers decide, after an access check, whether
//! to call [`NoteStore::decrypt`].
//!
//! | Method | Plaintext in | Plaintext out |
//! |--------|:---:|:---:|
//! | [`create`](NoteStore::create) | yes | yes ([`DecryptedNote`], built from the input, not re-read) |
//! | [`get`](NoteStore::get), [`list_owned_by`](NoteStore::list_owned_by), [`list_shared_with`](NoteStore::list_shared_with) | — | no |
//! | [`update`](NoteStore::update) | optional | no |
//! | [`decrypt`](NoteStore::decrypt) | — | yes |
//!
//! Grant creation is a single insert-if-absent on the backend; a second grant for
//! the same `(note, grantee)` pair fails with [`Error::AlreadyShared`].

use chrono::{DateTime, Utc};
use store::{Note, NoteBackend, NoteChanges, Permission, ShareGrant};
use uuid::Uuid;

use crate::crypto::NoteCipher;
use crate::error::Result;

/// A note with its body decrypted. Exists only in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptedNote {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DecryptedNote {
    fn from_stored(note: &Note, content: String) -> Self {
        Self {
            id: note.id,
            owner_id: note.owner_id,
            title: note.title.clone(),
            content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

pub struct NoteStore<B> {
    backend: B,
    cipher: NoteCipher,
}

impl<B: NoteBackend> NoteStore<B> {
    pub fn new(backend: B, cipher: NoteCipher) -> Self {
        Self { backend, cipher }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn create(&self, owner_id: Uuid, title: &str, content: &str) -> Result<DecryptedNote> {
        let sealed = self.cipher.encrypt(content)?;
        let note = self
            .backend
            .insert_note(Note::new(owner_id, title.to_string(), sealed))
            .await?;
        Ok(DecryptedNote::from_stored(&note, content.to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Note> {
        Ok(self.backend.get_note(id).await?)
    }

    pub async fn list_owned_by(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        Ok(self.backend.list_owned_by(owner_id).await?)
    }

    pub async fn list_shared_with(&self, user_id: Uuid) -> Result<Vec<(Note, ShareGrant)>> {
        Ok(self.backend.list_shared_with(user_id).await?)
    }

    /// `None` leaves a field as it is. `Some("")` overwrites it.
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<&str>,
    ) -> Result<Note> {
        let content = content.map(|c| self.cipher.encrypt(c)).transpose()?;
        Ok(self
            .backend
            .update_note(id, NoteChanges { title, content })
            .await?)
    }

    /// Grants pointing at the note are left behind and filtered on read.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        Ok(self.backend.delete_note(id).await?)
    }

    pub async fn find_grant(&self, note_id: Uuid, user_id: Uuid) -> Result<Option<ShareGrant>> {
        Ok(self.backend.find_grant(note_id, user_id).await?)
    }

    pub async fn create_grant(
        &self,
        note_id: Uuid,
        grantee_id: Uuid,
        permission: Permission,
    ) -> Result<ShareGrant> {
        Ok(self
            .backend
            .insert_grant(ShareGrant::new(note_id, grantee_id, permission))
            .await?)
    }

    pub fn decrypt(&self, note: &Note) -> Result<DecryptedNote> {
        let content = self.cipher.decrypt(&note.content)?;
        Ok(DecryptedNote::from_stored(note, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use store::MemoryStore;

    fn note_store() -> NoteStore<MemoryStore> {
        NoteStore::new(MemoryStore::new(), NoteCipher::generate())
    }

    #[tokio::test]
    async fn test_create_stores_ciphertext_only() {
        let notes = note_store();
        let owner = Uuid::new_v4();

        let created = notes.create(owner, "Groceries", "milk,eggs").await.unwrap();
        assert_eq!(created.content, "milk,eggs");
        assert_eq!(created.title, "Groceries");

        let stored = notes.get(created.id).await.unwrap();
        assert_ne!(stored.content.ciphertext, b"milk,eggs".to_vec());
        assert_eq!(notes.decrypt(&stored).unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_reencrypts_content() {
        let notes = note_store();
        let created = notes.create(Uuid::new_v4(), "t", "v1").await.unwrap();
        let before = notes.get(created.id).await.unwrap();

        let after = notes.update(created.id, None, Some("v2")).await.unwrap();
        assert_ne!(after.content, before.content);
        assert_eq!(after.title, "t");
        assert_eq!(notes.decrypt(&after).unwrap().content, "v2");

        // Title only: body bytes are untouched
        let renamed = notes
            .update(created.id, Some("renamed".into()), None)
            .await
            .unwrap();
        assert_eq!(renamed.content, after.content);
        assert_eq!(renamed.title, "renamed");
    }

    #[tokio::test]
    async fn test_decrypt_under_other_key_fails() {
        let backend = MemoryStore::new();
        let writer = NoteStore::new(backend.clone(), NoteCipher::generate());
        let reader = NoteStore::new(backend, NoteCipher::generate());

        let created = writer.create(Uuid::new_v4(), "t", "secret").await.unwrap();
        let stored = reader.get(created.id).await.unwrap();
        assert_eq!(reader.decrypt(&stored), Err(Error::DecryptionFailed));
    }

    #[tokio::test]
    async fn test_create_grant_twice_is_already_shared() {
        let notes = note_store();
        let created = notes.create(Uuid::new_v4(), "t", "c").await.unwrap();
        let grantee = Uuid::new_v4();

        notes
            .create_grant(created.id, grantee, Permission::Read)
            .await
            .unwrap();
        assert_eq!(
            notes
                .create_grant(created.id, grantee, Permission::Write)
                .await,
            Err(Error::AlreadyShared)
        );
    }

    #[tokio::test]
    async fn test_missing_note_is_not_found() {
        let notes = note_store();
        let id = Uuid::new_v4();
        assert_eq!(notes.get(id).await, Err(Error::NotFound));
        assert_eq!(notes.update(id, None, Some("x")).await, Err(Error::NotFound));
        assert_eq!(notes.delete(id).await, Err(Error::NotFound));
    }
}
