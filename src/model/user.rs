use serde::{Deserialize, Serialize};

/// A user account as the backend reports it
///
/// The backend exposes no surrogate id for users; `username` is the key for
/// every user operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}
