use serde::Serialize;

use crate::domain::User;
use crate::{ApiError, ThoughtsClient};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

impl ThoughtsClient {
    /// `POST /auth/login`. On success the server sets the session cookie in
    /// this client's jar; the returned record identifies the active user.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let url = self.url().append_path("auth/login");
        self.post_json(url, &LoginRequest { username, password })
            .await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.url().append_path("auth/logout");
        self.post_message(url, &serde_json::json!({})).await
    }
}
