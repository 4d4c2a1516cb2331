//! PostgreSQL implementation of the storage traits.
//!
//! Enums are stored as their wire strings (`READ`, `ADMIN`, `SHARE_NOTE`, ...) in
//! `TEXT` columns and parsed back on read. A row holding an unknown string is a
//! backend error, not a panic.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use store::{
    AuditAction, AuditEvent, AuditSink, EncryptedContent, Note, NoteBackend, NoteChanges,
    Permission, Role, ShareGrant, StoreError, User, UserDirectory,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn parse<T: FromStr>(column: &str, value: &str) -> Result<T, StoreError> {
    T::from_str(value)
        .map_err(|_| StoreError::Backend(format!("unexpected {column} value {value:?}")))
}

#[derive(FromRow)]
struct NoteRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    content_enc: Vec<u8>,
    nonce: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            content: EncryptedContent {
                ciphertext: row.content_enc,
                nonce: row.nonce,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct GrantRow {
    note_id: Uuid,
    grantee_id: Uuid,
    permission: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<GrantRow> for ShareGrant {
    type Error = StoreError;

    fn try_from(row: GrantRow) -> Result<Self, StoreError> {
        Ok(ShareGrant {
            note_id: row.note_id,
            grantee_id: row.grantee_id,
            permission: parse::<Permission>("permission", &row.permission)?,
            created_at: row.created_at,
        })
    }
}

/// A shared note joined with the grant that shares it.
#[derive(FromRow)]
struct SharedRow {
    #[sqlx(flatten)]
    note: NoteRow,
    permission: String,
    shared_at: DateTime<Utc>,
    grantee_id: Uuid,
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: parse::<Role>("role", &row.role)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct AuditRow {
    id: Uuid,
    actor_id: Uuid,
    action: String,
    target: String,
    source_addr: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEvent {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> Result<Self, StoreError> {
        Ok(AuditEvent {
            id: row.id,
            actor_id: row.actor_id,
            action: parse::<AuditAction>("action", &row.action)?,
            target: row.target,
            source_addr: row.source_addr,
            created_at: row.created_at,
        })
    }
}

const NOTE_COLUMNS: &str = "id, owner_id, title, content_enc, nonce, created_at, updated_at";

impl NoteBackend for PgStore {
    async fn insert_note(&self, note: Note) -> Result<Note, StoreError> {
        // Read back what Postgres stored: TIMESTAMPTZ keeps microseconds only
        let row: NoteRow = sqlx::query_as(&format!(
            "INSERT INTO notes (id, owner_id, title, content_enc, nonce, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(note.id)
        .bind(note.owner_id)
        .bind(&note.title)
        .bind(&note.content.ciphertext)
        .bind(&note.content.nonce)
        .bind(note.created_at)
        .bind(note.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(Note::from(row))
    }

    async fn get_note(&self, id: Uuid) -> Result<Note, StoreError> {
        let row: Option<NoteRow> =
            sqlx::query_as(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        row.map(Note::from).ok_or(StoreError::NotFound)
    }

    async fn list_owned_by(&self, owner_id: Uuid) -> Result<Vec<Note>, StoreError> {
        let rows: Vec<NoteRow> = sqlx::query_as(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn list_shared_with(&self, user_id: Uuid) -> Result<Vec<(Note, ShareGrant)>, StoreError> {
        // Inner join drops grants whose note is gone
        let rows: Vec<SharedRow> = sqlx::query_as(
            "SELECT n.id, n.owner_id, n.title, n.content_enc, n.nonce, n.created_at, n.updated_at, \
                    s.permission, s.created_at AS shared_at, s.grantee_id \
             FROM note_shares s JOIN notes n ON n.id = s.note_id \
             WHERE s.grantee_id = $1 \
             ORDER BY s.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter()
            .map(|row| {
                let grant = ShareGrant {
                    note_id: row.note.id,
                    grantee_id: row.grantee_id,
                    permission: parse::<Permission>("permission", &row.permission)?,
                    created_at: row.shared_at,
                };
                Ok((Note::from(row.note), grant))
            })
            .collect()
    }

    async fn update_note(&self, id: Uuid, changes: NoteChanges) -> Result<Note, StoreError> {
        let (ciphertext, nonce) = match changes.content {
            Some(content) => (Some(content.ciphertext), Some(content.nonce)),
            None => (None, None),
        };
        let row: Option<NoteRow> = sqlx::query_as(&format!(
            "UPDATE notes SET \
                title = COALESCE($2, title), \
                content_enc = COALESCE($3, content_enc), \
                nonce = COALESCE($4, nonce), \
                updated_at = $5 \
             WHERE id = $1 \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.title)
        .bind(ciphertext)
        .bind(nonce)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.map(Note::from).ok_or(StoreError::NotFound)
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_grant(
        &self,
        note_id: Uuid,
        grantee_id: Uuid,
    ) -> Result<Option<ShareGrant>, StoreError> {
        let row: Option<GrantRow> = sqlx::query_as(
            "SELECT note_id, grantee_id, permission, created_at FROM note_shares \
             WHERE note_id = $1 AND grantee_id = $2",
        )
        .bind(note_id)
        .bind(grantee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.map(ShareGrant::try_from).transpose()
    }

    async fn insert_grant(&self, grant: ShareGrant) -> Result<ShareGrant, StoreError> {
        // One statement, so two racing shares cannot both succeed
        let inserted: Option<GrantRow> = sqlx::query_as(
            "INSERT INTO note_shares (note_id, grantee_id, permission, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (note_id, grantee_id) DO NOTHING \
             RETURNING note_id, grantee_id, permission, created_at",
        )
        .bind(grant.note_id)
        .bind(grant.grantee_id)
        .bind(grant.permission.as_str())
        .bind(grant.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match inserted {
            Some(row) => ShareGrant::try_from(row),
            None => Err(StoreError::DuplicateGrant),
        }
    }
}

const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at";

impl UserDirectory for PgStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateUser)
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_handle(&self, handle: &str) -> Result<Option<User>, StoreError> {
        // Email match sorts first, then the oldest account with that name
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE email = lower($1) OR name = $1 \
             ORDER BY (email = lower($1)) DESC, created_at ASC \
             LIMIT 1"
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.map(User::try_from).transpose()
    }
}

impl AuditSink for PgStore {
    async fn append(&self, event: AuditEvent) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO audit_log (id, actor_id, action, target, source_addr, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event.id)
        .bind(event.actor_id)
        .bind(event.action.as_str())
        .bind(&event.target)
        .bind(&event.source_addr)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn list_by_actor(&self, actor_id: Uuid) -> Result<Vec<AuditEvent>, StoreError> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            "SELECT id, actor_id, action, target, source_addr, created_at FROM audit_log \
             WHERE actor_id = $1 ORDER BY created_at DESC",
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter().map(AuditEvent::try_from).collect()
    }
}
