//! # Access policy
//!
//! Pure decision functions over a note, the requesting identity and the grant (if
//! any) linking the two. No I/O, no errors: a missing grant simply means "no".
//!
//! | Check | Passes for |
//! |-------|-----------|
//! | [`can_read`] | the owner, or any grantee |
//! | [`can_write`] | the owner, or a `WRITE` grantee |
//! | [`can_delete`] | the owner, or an `ADMIN` |
//! | [`can_share`] | the owner only |
//!
//! Grants never confer delete or share rights, so a `WRITE` grantee cannot hand
//! the note on to a third user.

use serde::{Deserialize, Serialize};
use store::{Note, Permission, Role, ShareGrant};
use uuid::Uuid;

/// The authenticated caller, as vouched for by the session layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Only a grant for this exact note and requester counts.
fn grant_for<'a>(
    note: &Note,
    requester: &Identity,
    grant: Option<&'a ShareGrant>,
) -> Option<&'a ShareGrant> {
    grant.filter(|g| g.note_id == note.id && g.grantee_id == requester.id)
}

pub fn can_read(note: &Note, requester: &Identity, grant: Option<&ShareGrant>) -> bool {
    note.is_owned_by(requester.id) || grant_for(note, requester, grant).is_some()
}

pub fn can_write(note: &Note, requester: &Identity, grant: Option<&ShareGrant>) -> bool {
    note.is_owned_by(requester.id)
        || grant_for(note, requester, grant).is_some_and(|g| g.permission == Permission::Write)
}

pub fn can_delete(note: &Note, requester: &Identity) -> bool {
    note.is_owned_by(requester.id) || requester.is_admin()
}

pub fn can_share(note: &Note, requester: &Identity) -> bool {
    note.is_owned_by(requester.id)
}
