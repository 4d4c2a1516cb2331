//! Local (email + password) accounts and session keys.

mod accounts;
mod password;
mod session;

pub use accounts::Accounts;
pub use password::{hash_password, verify_password};
pub use session::SESSION_USER_ID_KEY;
