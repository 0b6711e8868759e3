//! In-memory backend for tests and offline development.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use thoughts_api::domain::{CustomField, Entry, Tag, User};
use thoughts_api::{ApiError, EntryQuery, Scope, ServerErrorKind};

use super::Backend;

/// Per-operation call counters, readable from tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_entries: u32,
    pub fetch_entry: u32,
    pub create_entry: u32,
    pub update_entry: u32,
    pub delete_entry: u32,
    pub fetch_custom_fields: u32,
    pub fetch_tags: u32,
    pub fetch_users: u32,
}

#[derive(Default)]
struct MockState {
    entries: Vec<Entry>,
    fields: Vec<CustomField>,
    tags: Vec<Tag>,
    users: Vec<User>,
    next_id: i64,
    calls: CallCounts,
    fail_writes: bool,
    fail_reads: bool,
}

/// Mock thoughts server backed by in-memory vectors. Mimics the server's
/// observable behavior: id assignment on create, `EntryExists` on a
/// duplicate day, full-record responses on every write.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.lock().next_id = 1;
        backend
    }

    pub fn with_entries(self, entries: Vec<Entry>) -> Self {
        {
            let mut state = self.lock();
            state.next_id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
            state.entries = entries;
        }
        self
    }

    pub fn with_fields(self, fields: Vec<CustomField>) -> Self {
        self.lock().fields = fields;
        self
    }

    pub fn with_tags(self, tags: Vec<Tag>) -> Self {
        self.lock().tags = tags;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.lock().users = users;
        self
    }

    /// Make every write operation fail with a transport error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make every list fetch fail with a transport error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.lock().entries.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock store lock poisoned")
    }
}

fn injected_failure() -> ApiError {
    ApiError::Transport("injected failure".to_string())
}

/// Ids for server-unknown records (negative client-local text entry ids).
fn assign_text_ids(entry: &mut Entry, next_id: &mut i64) {
    for text in &mut entry.text_entries {
        if text.id <= 0 {
            text.id = *next_id;
            *next_id += 1;
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_entries(
        &self,
        _scope: Scope,
        query: &EntryQuery,
    ) -> Result<Vec<Entry>, ApiError> {
        let mut state = self.lock();
        state.calls.fetch_entries += 1;
        if state.fail_reads {
            return Err(injected_failure());
        }
        Ok(state
            .entries
            .iter()
            .filter(|e| query.from.map_or(true, |from| e.day >= from))
            .filter(|e| query.to.map_or(true, |to| e.day <= to))
            .cloned()
            .collect())
    }

    async fn fetch_entry(&self, id: i64) -> Result<Entry, ApiError> {
        let mut state = self.lock();
        state.calls.fetch_entry += 1;
        state
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Server {
                kind: ServerErrorKind::Other("EntryNotFound".to_string()),
                message: format!("no entry with id {}", id),
                status: 404,
            })
    }

    async fn create_entry(&self, entry: &Entry) -> Result<Entry, ApiError> {
        let mut state = self.lock();
        state.calls.create_entry += 1;
        if state.fail_writes {
            return Err(injected_failure());
        }
        if state
            .entries
            .iter()
            .any(|e| e.owner == entry.owner && e.day == entry.day)
        {
            return Err(ApiError::Server {
                kind: ServerErrorKind::EntryExists,
                message: "an entry already exists for that day".to_string(),
                status: 400,
            });
        }

        let mut created = entry.clone();
        created.id = state.next_id;
        state.next_id += 1;
        let mut next_id = state.next_id;
        assign_text_ids(&mut created, &mut next_id);
        state.next_id = next_id;
        state.entries.push(created.clone());
        Ok(created)
    }

    async fn update_entry(&self, entry: &Entry) -> Result<Entry, ApiError> {
        let mut state = self.lock();
        state.calls.update_entry += 1;
        if state.fail_writes {
            return Err(injected_failure());
        }

        let mut updated = entry.clone();
        let mut next_id = state.next_id;
        assign_text_ids(&mut updated, &mut next_id);
        state.next_id = next_id;

        match state.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = updated.clone();
                Ok(updated)
            }
            None => Err(ApiError::Server {
                kind: ServerErrorKind::Other("EntryNotFound".to_string()),
                message: format!("no entry with id {}", entry.id),
                status: 404,
            }),
        }
    }

    async fn delete_entry(&self, id: i64) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.delete_entry += 1;
        if state.fail_writes {
            return Err(injected_failure());
        }
        state.entries.retain(|e| e.id != id);
        Ok(())
    }

    async fn fetch_custom_fields(&self, _scope: Scope) -> Result<Vec<CustomField>, ApiError> {
        let mut state = self.lock();
        state.calls.fetch_custom_fields += 1;
        if state.fail_reads {
            return Err(injected_failure());
        }
        Ok(state.fields.clone())
    }

    async fn fetch_tags(&self, _scope: Scope) -> Result<Vec<Tag>, ApiError> {
        let mut state = self.lock();
        state.calls.fetch_tags += 1;
        if state.fail_reads {
            return Err(injected_failure());
        }
        Ok(state.tags.clone())
    }

    async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        let mut state = self.lock();
        state.calls.fetch_users += 1;
        Ok(state.users.clone())
    }
}
