//! # Client-safe user projection
//!
//! [`UserInfo`] is what leaves the server for a [`store::User`]: it omits the
//! password hash and creation timestamp. [`UserInfo::identity`] narrows it further
//! to the `{id, role}` pair the note service authorises against.

use serde::{Deserialize, Serialize};
use store::{Role, User};
use uuid::Uuid;

use crate::notes::Identity;

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl UserInfo {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}
