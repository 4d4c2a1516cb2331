//! Client-safe projections returned by the service layer.

mod note;
mod user;

pub use note::{NoteView, ShareInfo};
pub use user::UserInfo;
