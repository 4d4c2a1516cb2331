//! # Domain records for notes, grants, users and audit events
//!
//! Defines the rows a [`crate::NoteBackend`], [`crate::UserDirectory`] or
//! [`crate::AuditSink`] persists. Everything here is storage-shaped: note content
//! only ever appears as [`EncryptedContent`], and users carry their password hash.
//! Client-safe projections live in the `api` crate.
//!
//! ## Types
//!
//! | Struct / enum | Represents |
//! |---------------|-----------|
//! | [`Note`] | A stored note. Title is plaintext, body is AES-GCM ciphertext plus nonce. Exactly one owner for its whole lifetime. |
//! | [`ShareGrant`] | A directed permission edge from a note to a non-owner user. At most one per `(note_id, grantee_id)`. |
//! | [`Permission`] | `READ` or `WRITE`, attached to a grant. |
//! | [`User`] | An account row: unique email, display name, Argon2 PHC hash and [`Role`]. |
//! | [`AuditEvent`] | Append-only record of who did what to which resource, from where. |
//! | [`AuditAction`] | The action kinds recorded in the audit trail. |
//!
//! [`Permission`], [`Role`] and [`AuditAction`] serialise as upper-case strings
//! (`"WRITE"`, `"ADMIN"`, `"SHARE_NOTE"`) and round-trip through [`FromStr`] so
//! SQL backends can store them as `TEXT`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission level carried by a [`ShareGrant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    Read,
    Write,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "READ",
            Permission::Write => "WRITE",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(Permission::Read),
            "WRITE" => Ok(Permission::Write),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Account role. Administrators may delete any note but gain no read or write rights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Returned when a stored string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// AES-256-GCM ciphertext together with the nonce it was sealed under.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedContent {
    pub ciphertext: Vec<u8>,
    /// 12-byte GCM nonce, unique per encryption
    pub nonce: Vec<u8>,
}

impl fmt::Debug for EncryptedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedContent")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("nonce_len", &self.nonce.len())
            .finish()
    }
}

/// A note as persisted: plaintext title, encrypted body.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: EncryptedContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a fresh note record with a new id and both timestamps set to now.
    pub fn new(owner_id: Uuid, title: String, content: EncryptedContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Partial update applied by [`crate::NoteBackend::update_note`].
/// `None` leaves a field untouched; `Some("")` is a real change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<EncryptedContent>,
}

/// Permission edge from a note to a grantee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGrant {
    pub note_id: Uuid,
    pub grantee_id: Uuid,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
}

impl ShareGrant {
    pub fn new(note_id: Uuid, grantee_id: Uuid, permission: Permission) -> Self {
        Self {
            note_id,
            grantee_id,
            permission,
            created_at: Utc::now(),
        }
    }
}

/// Full account record.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Lower-cased, unique
    pub email: String,
    pub name: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Action kinds recorded in the audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    CreateNote,
    ReadNote,
    UpdateNote,
    DeleteNote,
    ShareNote,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::CreateNote => "CREATE_NOTE",
            AuditAction::ReadNote => "READ_NOTE",
            AuditAction::UpdateNote => "UPDATE_NOTE",
            AuditAction::DeleteNote => "DELETE_NOTE",
            AuditAction::ShareNote => "SHARE_NOTE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOGIN" => Ok(AuditAction::Login),
            "CREATE_NOTE" => Ok(AuditAction::CreateNote),
            "READ_NOTE" => Ok(AuditAction::ReadNote),
            "UPDATE_NOTE" => Ok(AuditAction::UpdateNote),
            "DELETE_NOTE" => Ok(AuditAction::DeleteNote),
            "SHARE_NOTE" => Ok(AuditAction::ShareNote),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Immutable audit record. Never updated or deleted once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    /// Id of the note (or user, for `LOGIN`) the action targeted
    pub target: String,
    pub source_addr: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        actor_id: Uuid,
        action: AuditAction,
        target: impl Into<String>,
        source_addr: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            action,
            target: target.into(),
            source_addr,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_strings_roundtrip() {
        for p in [Permission::Read, Permission::Write] {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::default(), Role::User);
        assert_eq!(
            "SHARE_NOTE".parse::<AuditAction>().unwrap(),
            AuditAction::ShareNote
        );
    }

    #[test]
    fn test_lowercase_permission_is_rejected() {
        assert_eq!(
            "read".parse::<Permission>(),
            Err(UnknownVariant("read".to_string()))
        );
        assert!("OWNER".parse::<Permission>().is_err());
    }

    #[test]
    fn test_encrypted_content_debug_hides_bytes() {
        let content = EncryptedContent {
            ciphertext: b"secret bytes".to_vec(),
            nonce: vec![0; 12],
        };
        let debug = format!("{:?}", content);
        assert!(debug.contains("ciphertext_len: 12"));
        assert!(!debug.contains("ciphertext: ["));
    }
}
