use crate::domain::User;
use crate::{ApiError, ThoughtsClient};

impl ThoughtsClient {
    /// Accounts the logged-in user has been granted read access to.
    pub async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.url().append_path("users");
        self.get_json(url).await
    }
}
