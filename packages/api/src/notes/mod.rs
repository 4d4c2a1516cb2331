//! Notes: access policy, encrypted storage and the orchestrating service.

pub mod policy;
mod service;
mod store;

pub use self::policy::Identity;
pub use self::service::{Caller, NoteService};
pub use self::store::{DecryptedNote, NoteStore};
