use serde::{Deserialize, Serialize};

/// Identity issued by the auth service for the current session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub username: String,
}
