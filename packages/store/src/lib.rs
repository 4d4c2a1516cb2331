pub mod error;
pub mod models;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

pub use error::StoreError;
pub use models::{
    AuditAction, AuditEvent, EncryptedContent, Note, NoteChanges, Permission, Role, ShareGrant,
    User,
};
pub use repo::{AuditSink, NoteBackend, UserDirectory};
