use serde::{Deserialize, Serialize};

/// An account, as returned by `POST /auth/login` and the user listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub level: i32,
    pub full_name: Option<String>,
    pub email: Option<String>,
}
