use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::{Permission, ShareGrant};
use uuid::Uuid;

use crate::notes::DecryptedNote;

/// A decrypted note annotated with the caller's relation to it.
///
/// Owners see `permission: WRITE, isOwner: true`. Grantees see their grant's
/// permission and when it was made.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub owner_id: Uuid,
    pub permission: Permission,
    pub is_owner: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_at: Option<DateTime<Utc>>,
}

impl NoteView {
    pub fn owned(note: DecryptedNote) -> Self {
        Self::build(note, Permission::Write, true, None)
    }

    pub fn shared(note: DecryptedNote, grant: &ShareGrant) -> Self {
        Self::build(note, grant.permission, false, Some(grant.created_at))
    }

    fn build(
        note: DecryptedNote,
        permission: Permission,
        is_owner: bool,
        shared_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            owner_id: note.owner_id,
            permission,
            is_owner,
            created_at: note.created_at,
            updated_at: note.updated_at,
            shared_at,
        }
    }
}

/// Outcome of a successful share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareInfo {
    pub note_id: Uuid,
    pub grantee_id: Uuid,
    pub grantee_name: String,
    pub permission: Permission,
    pub shared_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decrypted() -> DecryptedNote {
        let now = Utc::now();
        DecryptedNote {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Groceries".into(),
            content: "milk,eggs".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_owned_view_json_shape() {
        let json = serde_json::to_value(NoteView::owned(decrypted())).unwrap();
        assert_eq!(json["isOwner"], true);
        assert_eq!(json["permission"], "WRITE");
        assert_eq!(json["content"], "milk,eggs");
        assert!(json.get("sharedAt").is_none());
    }

    #[test]
    fn test_shared_view_carries_grant() {
        let note = decrypted();
        let grant = ShareGrant::new(note.id, Uuid::new_v4(), Permission::Read);
        let view = NoteView::shared(note, &grant);
        assert!(!view.is_owner);
        assert_eq!(view.permission, Permission::Read);
        assert_eq!(view.shared_at, Some(grant.created_at));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["permission"], "READ");
        assert!(json.get("ownerId").is_some());
    }
}
