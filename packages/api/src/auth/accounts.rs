//! # Local accounts: register, log in, look up
//!
//! [`Accounts`] owns the credential side of the vault. It hands out [`UserInfo`]
//! values; turning one into a session is the HTTP layer's job, keyed on
//! [`SESSION_USER_ID_KEY`](super::SESSION_USER_ID_KEY).
//!
//! Emails are trimmed and lowercased before they are stored or looked up, so
//! `Alice@Example.com` and `alice@example.com` are the same account. A failed
//! login never says whether the email or the password was wrong.

use store::{AuditAction, AuditSink, Role, User, UserDirectory};
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use crate::audit::AuditTrail;
use crate::error::{Error, Result};
use crate::models::UserInfo;
use crate::notes::Identity;

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct Accounts<U, A> {
    users: U,
    audit: AuditTrail<A>,
}

impl<U, A> Accounts<U, A>
where
    U: UserDirectory,
    A: AuditSink,
{
    pub fn new(users: U, audit: A) -> Self {
        Self {
            users,
            audit: AuditTrail::new(audit),
        }
    }

    /// Create a `USER`-role account. Admins are provisioned out of band.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserInfo> {
        self.register_with_role(name, email, password, Role::User)
            .await
    }

    async fn register_with_role(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserInfo> {
        let email = email.trim().to_lowercase();
        let name = name.trim();

        if email.is_empty() || !email.contains('@') {
            return Err(Error::invalid("Invalid email address"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::invalid("Password must be at least 8 characters"));
        }
        if name.is_empty() {
            return Err(Error::invalid("Name is required"));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .insert_user(User::new(email, name.to_string(), password_hash, role))
            .await?;
        tracing::info!(user_id = %user.id, %role, "Registered account");

        Ok(UserInfo::from(&user))
    }

    /// Check credentials and record a `LOGIN` event against the user.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        source_addr: Option<&str>,
    ) -> Result<UserInfo> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.users.find_user_by_email(&email).await? else {
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.into()));
        };
        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.audit
            .record(user.id, AuditAction::Login, user.id.to_string(), source_addr)
            .await;
        Ok(UserInfo::from(&user))
    }

    /// Resolve a session's user id. `None` if the account no longer exists.
    pub async fn find(&self, user_id: Uuid) -> Result<Option<UserInfo>> {
        Ok(self
            .users
            .find_user(user_id)
            .await?
            .map(|user| UserInfo::from(&user)))
    }

    /// The `{id, role}` a session's user id stands for. A stale id is `Unauthorized`.
    pub async fn identity(&self, user_id: Uuid) -> Result<Identity> {
        self.find(user_id)
            .await?
            .map(|user| user.identity())
            .ok_or_else(|| Error::Unauthorized("Session expired".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn accounts() -> (Accounts<MemoryStore, MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (Accounts::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn test_register_normalises_email() {
        let (accounts, _) = accounts();
        let user = accounts
            .register("  Alice ", " Alice@Example.COM ", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (accounts, _) = accounts();
        for (name, email, password) in [
            ("a", "no-at-sign", "longenough"),
            ("a", "a@x.io", "short"),
            ("  ", "a@x.io", "longenough"),
        ] {
            let err = accounts.register(name, email, password).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (accounts, _) = accounts();
        accounts.register("a", "a@x.io", "longenough").await.unwrap();
        let err = accounts
            .register("b", "A@X.io", "longenough")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::invalid("An account with this email already exists")
        );
    }

    #[tokio::test]
    async fn test_login_records_event() {
        let (accounts, store) = accounts();
        let user = accounts.register("a", "a@x.io", "longenough").await.unwrap();

        let logged_in = accounts
            .login("A@x.io", "longenough", Some("10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(logged_in, user);

        let events = store.audit_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::Login);
        assert_eq!(events[0].actor_id, user.id);
        assert_eq!(events[0].source_addr.as_deref(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (accounts, store) = accounts();
        accounts.register("a", "a@x.io", "longenough").await.unwrap();

        let wrong_password = accounts.login("a@x.io", "nope-nope", None).await;
        let unknown_email = accounts.login("b@x.io", "longenough", None).await;
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(
            wrong_password,
            Err(Error::Unauthorized(INVALID_CREDENTIALS.into()))
        );
        assert!(store.audit_events().is_empty());
    }

    #[tokio::test]
    async fn test_find() {
        let (accounts, _) = accounts();
        let user = accounts.register("a", "a@x.io", "longenough").await.unwrap();
        assert_eq!(accounts.find(user.id).await.unwrap(), Some(user));
        assert_eq!(accounts.find(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_identity_for_stale_session() {
        let (accounts, _) = accounts();
        let user = accounts.register("a", "a@x.io", "longenough").await.unwrap();
        assert_eq!(
            accounts.identity(user.id).await.unwrap(),
            Identity::new(user.id, Role::User)
        );
        assert!(matches!(
            accounts.identity(Uuid::new_v4()).await,
            Err(Error::Unauthorized(_))
        ));
    }
}
