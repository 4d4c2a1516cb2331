//! PostgreSQL backend tests. They need the `server` feature and a reachable
//! database in `DATABASE_URL`, and are skipped otherwise.
#![cfg(feature = "server")]

use api::db::{connect, migrate, PgStore};
use chrono::{Duration, Utc};
use store::{
    EncryptedContent, Note, NoteBackend, NoteChanges, Permission, Role, ShareGrant, User,
    UserDirectory,
};
use uuid::Uuid;

async fn pg_store() -> Option<PgStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = connect(&url, 2).await.unwrap();
    migrate(&pool).await.unwrap();
    Some(PgStore::new(pool))
}

async fn user(store: &PgStore, name: &str) -> User {
    let email = format!("{}@{name}.test", Uuid::new_v4());
    store
        .insert_user(User::new(email, name.into(), "x".into(), Role::User))
        .await
        .unwrap()
}

fn sealed(tag: &str) -> EncryptedContent {
    EncryptedContent {
        ciphertext: tag.as_bytes().to_vec(),
        nonce: vec![0; 12],
    }
}

#[tokio::test]
async fn test_inserted_note_matches_stored_row() {
    let Some(store) = pg_store().await else {
        return;
    };
    let owner = user(&store, "owner").await;

    let inserted = store
        .insert_note(Note::new(owner.id, "t".into(), sealed("c")))
        .await
        .unwrap();
    let fetched = store.get_note(inserted.id).await.unwrap();

    // Timestamps come back at the column's precision, not the caller's
    assert_eq!(inserted, fetched);
    assert_eq!(inserted.created_at.timestamp_subsec_nanos() % 1_000, 0);
}

#[tokio::test]
async fn test_list_shared_newest_grant_first() {
    let Some(store) = pg_store().await else {
        return;
    };
    let owner = user(&store, "owner").await;
    let grantee = user(&store, "grantee").await;

    let older = store
        .insert_note(Note::new(owner.id, "older grant".into(), sealed("a")))
        .await
        .unwrap();
    let newer = store
        .insert_note(Note::new(owner.id, "newer grant".into(), sealed("b")))
        .await
        .unwrap();

    let mut first = ShareGrant::new(older.id, grantee.id, Permission::Read);
    first.created_at = Utc::now() - Duration::minutes(5);
    store.insert_grant(first).await.unwrap();
    store
        .insert_grant(ShareGrant::new(newer.id, grantee.id, Permission::Write))
        .await
        .unwrap();

    // Editing the older-shared note must not move it up
    store
        .update_note(
            older.id,
            NoteChanges {
                title: Some("edited".into()),
                content: None,
            },
        )
        .await
        .unwrap();

    let shared = store.list_shared_with(grantee.id).await.unwrap();
    let ids: Vec<Uuid> = shared.iter().map(|(note, _)| note.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}
