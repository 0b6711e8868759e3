//! Backend abstraction over the thoughts server.
//!
//! Session and store code talk to this trait instead of the concrete HTTP
//! client so tests can run against [`MockBackend`].

use async_trait::async_trait;

use thoughts_api::domain::{CustomField, Entry, Tag, User};
use thoughts_api::{ApiError, EntryQuery, Scope, ThoughtsClient};

mod mock;

pub use mock::MockBackend;

#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_entries(&self, scope: Scope, query: &EntryQuery)
        -> Result<Vec<Entry>, ApiError>;
    async fn fetch_entry(&self, id: i64) -> Result<Entry, ApiError>;
    async fn create_entry(&self, entry: &Entry) -> Result<Entry, ApiError>;
    async fn update_entry(&self, entry: &Entry) -> Result<Entry, ApiError>;
    async fn delete_entry(&self, id: i64) -> Result<(), ApiError>;

    async fn fetch_custom_fields(&self, scope: Scope) -> Result<Vec<CustomField>, ApiError>;
    async fn fetch_tags(&self, scope: Scope) -> Result<Vec<Tag>, ApiError>;
    async fn fetch_users(&self) -> Result<Vec<User>, ApiError>;
}

#[async_trait]
impl Backend for ThoughtsClient {
    async fn fetch_entries(
        &self,
        scope: Scope,
        query: &EntryQuery,
    ) -> Result<Vec<Entry>, ApiError> {
        ThoughtsClient::fetch_entries(self, scope, query).await
    }

    async fn fetch_entry(&self, id: i64) -> Result<Entry, ApiError> {
        ThoughtsClient::fetch_entry(self, id).await
    }

    async fn create_entry(&self, entry: &Entry) -> Result<Entry, ApiError> {
        ThoughtsClient::create_entry(self, entry).await
    }

    async fn update_entry(&self, entry: &Entry) -> Result<Entry, ApiError> {
        ThoughtsClient::update_entry(self, entry).await
    }

    async fn delete_entry(&self, id: i64) -> Result<(), ApiError> {
        ThoughtsClient::delete_entry(self, id).await
    }

    async fn fetch_custom_fields(&self, scope: Scope) -> Result<Vec<CustomField>, ApiError> {
        ThoughtsClient::fetch_custom_fields(self, scope).await
    }

    async fn fetch_tags(&self, scope: Scope) -> Result<Vec<Tag>, ApiError> {
        ThoughtsClient::fetch_tags(self, scope).await
    }

    async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        ThoughtsClient::fetch_users(self).await
    }
}
