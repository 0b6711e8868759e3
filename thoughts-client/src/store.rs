//! Process-wide caches for entries, fields and tags.
//!
//! Each cache is a [`Slice`]: the fetched items plus an id-indexed lookup
//! kept in lock-step through every mutation. The [`Store`] bundles the
//! slices into one injectable container so tests can spin up isolated
//! instances instead of sharing a global.

use std::collections::HashMap;

use thoughts_api::domain::{CustomField, Entry, Tag, User};
use thoughts_api::{ApiError, EntryQuery, Scope};

use crate::backend::Backend;

/// Records that live in an id-indexed [`Slice`].
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for Entry {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for CustomField {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Tag {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for User {
    fn key(&self) -> i64 {
        self.id
    }
}

/// One cached collection. `owner` records whose account the items belong to,
/// so views can detect that a different user's data is loaded and refetch.
#[derive(Debug, Clone)]
pub struct Slice<T> {
    owner: Option<i64>,
    loading: bool,
    items: Vec<T>,
    mapping: HashMap<i64, usize>,
}

impl<T: Keyed> Default for Slice<T> {
    fn default() -> Self {
        Self {
            owner: None,
            loading: false,
            items: Vec::new(),
            mapping: HashMap::new(),
        }
    }
}

impl<T: Keyed> Slice<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<i64> {
        self.owner
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.mapping.get(&id).map(|&idx| &self.items[idx])
    }

    /// True when the cache holds a different account's data (or none).
    pub fn needs_fetch(&self, owner: i64) -> bool {
        self.owner != Some(owner)
    }

    /// Duplicate-fetch guard. Returns `false` while a fetch is in flight;
    /// the caller must treat that as a no-op, not queue a second request.
    pub fn begin_fetch(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Replace the cached items atomically and record the owning account.
    pub fn finish_fetch(&mut self, owner: i64, items: Vec<T>) {
        self.mapping = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.key(), idx))
            .collect();
        self.items = items;
        self.owner = Some(owner);
        self.loading = false;
    }

    pub fn abort_fetch(&mut self) {
        self.loading = false;
    }

    pub fn add_item(&mut self, item: T) {
        self.mapping.insert(item.key(), self.items.len());
        self.items.push(item);
    }

    /// Replace the cached record with the same id. Returns `false` when the
    /// id is not cached.
    pub fn update_item(&mut self, item: T) -> bool {
        match self.mapping.get(&item.key()) {
            Some(&idx) => {
                self.items[idx] = item;
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, id: i64) -> Option<T> {
        let idx = self.mapping.remove(&id)?;
        let removed = self.items.remove(idx);
        // Indices above the removal point shifted down.
        self.mapping = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.key(), idx))
            .collect();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.owner = None;
        self.loading = false;
        self.items.clear();
        self.mapping.clear();
    }
}

/// All cached client state. One instance per logged-in client; components
/// receive it explicitly instead of reaching for a global.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub entries: Slice<Entry>,
    pub custom_fields: Slice<CustomField>,
    pub tags: Slice<Tag>,
    pub active_user: Option<User>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the logged-out state.
    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.custom_fields.clear();
        self.tags.clear();
        self.active_user = None;
    }
}

/// Fetch entries into the store. Returns `Ok(false)` when a fetch was
/// already in flight (the duplicate call is a no-op).
pub async fn fetch_entries(
    store: &mut Store,
    backend: &impl Backend,
    owner: i64,
    scope: Scope,
    query: &EntryQuery,
) -> Result<bool, ApiError> {
    if !store.entries.begin_fetch() {
        return Ok(false);
    }
    match backend.fetch_entries(scope, query).await {
        Ok(items) => {
            store.entries.finish_fetch(owner, items);
            Ok(true)
        }
        Err(e) => {
            store.entries.abort_fetch();
            tracing::warn!(error = %e, "entries fetch failed");
            Err(e)
        }
    }
}

pub async fn fetch_custom_fields(
    store: &mut Store,
    backend: &impl Backend,
    owner: i64,
    scope: Scope,
) -> Result<bool, ApiError> {
    if !store.custom_fields.begin_fetch() {
        return Ok(false);
    }
    match backend.fetch_custom_fields(scope).await {
        Ok(items) => {
            store.custom_fields.finish_fetch(owner, items);
            Ok(true)
        }
        Err(e) => {
            store.custom_fields.abort_fetch();
            tracing::warn!(error = %e, "custom fields fetch failed");
            Err(e)
        }
    }
}

pub async fn fetch_tags(
    store: &mut Store,
    backend: &impl Backend,
    owner: i64,
    scope: Scope,
) -> Result<bool, ApiError> {
    if !store.tags.begin_fetch() {
        return Ok(false);
    }
    match backend.fetch_tags(scope).await {
        Ok(items) => {
            store.tags.finish_fetch(owner, items);
            Ok(true)
        }
        Err(e) => {
            store.tags.abort_fetch();
            tracing::warn!(error = %e, "tags fetch failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn tag(id: i64, title: &str) -> Tag {
        Tag {
            id,
            title: title.to_string(),
            color: "#aabbcc".to_string(),
            comment: None,
            owner: 1,
        }
    }

    fn assert_lockstep<T: Keyed>(slice: &Slice<T>) {
        assert_eq!(slice.items.len(), slice.mapping.len());
        for (idx, item) in slice.items.iter().enumerate() {
            assert_eq!(slice.mapping.get(&item.key()), Some(&idx));
        }
    }

    #[test]
    fn items_and_mapping_stay_in_lockstep() {
        let mut slice = Slice::new();
        slice.add_item(tag(1, "gym"));
        assert_lockstep(&slice);

        slice.add_item(tag(2, "work"));
        assert_lockstep(&slice);

        assert!(slice.update_item(tag(1, "exercise")));
        assert_lockstep(&slice);
        assert_eq!(slice.get(1).map(|t| t.title.as_str()), Some("exercise"));

        assert!(slice.remove_item(1).is_some());
        assert_lockstep(&slice);

        assert!(slice.remove_item(2).is_some());
        assert_lockstep(&slice);
        assert!(slice.is_empty());
    }

    #[test]
    fn add_update_remove_single_record_ends_empty() {
        let mut slice = Slice::new();
        slice.add_item(tag(9, "a"));
        assert!(slice.update_item(tag(9, "b")));
        assert!(slice.remove_item(9).is_some());
        assert!(slice.items().is_empty());
        assert_lockstep(&slice);
    }

    #[test]
    fn removing_from_the_middle_reindexes_later_items() {
        let mut slice = Slice::new();
        for id in 1..=4 {
            slice.add_item(tag(id, "t"));
        }
        slice.remove_item(2);
        assert_lockstep(&slice);
        assert_eq!(slice.get(4).map(|t| t.id), Some(4));
    }

    #[test]
    fn update_of_uncached_id_is_rejected() {
        let mut slice: Slice<Tag> = Slice::new();
        assert!(!slice.update_item(tag(5, "missing")));
        assert!(slice.remove_item(5).is_none());
        assert_lockstep(&slice);
    }

    #[test]
    fn owner_change_requires_refetch() {
        let mut slice = Slice::new();
        slice.finish_fetch(1, vec![tag(1, "mine")]);
        assert!(!slice.needs_fetch(1));
        assert!(slice.needs_fetch(2));

        slice.clear();
        assert!(slice.needs_fetch(1));
        assert!(slice.is_empty());
    }

    #[tokio::test]
    async fn duplicate_fetch_is_suppressed_while_loading() {
        let backend = MockBackend::new().with_tags(vec![tag(1, "gym")]);
        let mut store = Store::new();

        // Simulate an in-flight request, then issue a duplicate fetch.
        assert!(store.tags.begin_fetch());
        let issued = fetch_tags(&mut store, &backend, 1, Scope::Own).await.unwrap();
        assert!(!issued);
        assert_eq!(backend.calls().fetch_tags, 0);

        // Once the first fetch settles, fetching works again.
        store.tags.abort_fetch();
        let issued = fetch_tags(&mut store, &backend, 1, Scope::Own).await.unwrap();
        assert!(issued);
        assert_eq!(backend.calls().fetch_tags, 1);
        assert_eq!(store.tags.len(), 1);
        assert_eq!(store.tags.owner(), Some(1));
    }

    #[tokio::test]
    async fn failed_fetch_clears_the_loading_flag() {
        let backend = MockBackend::new();
        backend.set_fail_reads(true);
        let mut store = Store::new();

        let result = fetch_entries(
            &mut store,
            &backend,
            1,
            Scope::Own,
            &EntryQuery::default(),
        )
        .await;
        assert!(result.is_err());
        assert!(!store.entries.is_loading());

        // The cache is not stuck: the next fetch goes through.
        backend.set_fail_reads(false);
        let issued = fetch_entries(
            &mut store,
            &backend,
            1,
            Scope::Own,
            &EntryQuery::default(),
        )
        .await
        .unwrap();
        assert!(issued);
    }

    #[test]
    fn clear_all_resets_to_logged_out() {
        let mut store = Store::new();
        store.tags.add_item(tag(1, "gym"));
        store.active_user = Some(User {
            id: 1,
            username: "sam".to_string(),
            level: 20,
            full_name: None,
            email: None,
        });
        store.clear_all();
        assert!(store.tags.is_empty());
        assert!(store.active_user.is_none());
    }
}
