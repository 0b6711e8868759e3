//! In-progress edit of one entry.
//!
//! A session holds two copies of the record: `original` (last synced with
//! the server) and `current` (the working copy), so edits can be reset
//! without a round trip. A field-id index enforces at most one value per
//! field within the session.

use std::collections::HashSet;

use chrono::Utc;

use thoughts_api::domain::{CustomField, CustomFieldEntry, Entry, FieldValue, TextEntry};
use thoughts_api::ApiError;

use crate::backend::Backend;
use crate::store::Slice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Entry has never been saved; `save` issues a create.
    New,
    /// Entry exists server-side; `save` issues an update.
    Existing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing changed since the last sync.
    Clean,
    /// A save or delete is already in flight; this call did nothing.
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The entry was never saved; there is nothing to delete server-side.
    NeverSaved,
    InFlight,
}

#[derive(Debug)]
pub struct EntrySession {
    original: Entry,
    current: Entry,
    existing_fields: HashSet<i64>,
    dirty: bool,
    mode: SessionMode,
    sending: bool,
    deleting: bool,
    deleted: bool,
}

fn index_fields(entry: &Entry) -> HashSet<i64> {
    entry
        .custom_field_entries
        .iter()
        .map(|cfe| cfe.field)
        .collect()
}

impl EntrySession {
    /// Start editing a fresh entry dated today (not yet saved).
    pub fn new_for_today(owner: i64) -> Self {
        Self::from_entry(Entry::new_for_today(owner))
    }

    /// Start editing an existing entry fetched from the server.
    pub async fn load(backend: &impl Backend, id: i64) -> Result<Self, ApiError> {
        Ok(Self::from_entry(backend.fetch_entry(id).await?))
    }

    pub fn from_entry(entry: Entry) -> Self {
        let mode = if entry.is_new() {
            SessionMode::New
        } else {
            SessionMode::Existing
        };
        let existing_fields = index_fields(&entry);
        Self {
            original: entry.clone(),
            current: entry,
            existing_fields,
            dirty: false,
            mode,
            sending: false,
            deleting: false,
            deleted: false,
        }
    }

    pub fn current(&self) -> &Entry {
        &self.current
    }

    pub fn original(&self) -> &Entry {
        &self.original
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Whether the session already holds a value for the given field.
    pub fn has_field_entry(&self, field_id: i64) -> bool {
        self.existing_fields.contains(&field_id)
    }

    /// Discard edits: `current` becomes a fresh copy of `original`.
    /// No-op when nothing changed; idempotent.
    pub fn reset_to_original(&mut self) {
        if !self.dirty {
            return;
        }
        self.current = self.original.clone();
        self.existing_fields = index_fields(&self.current);
        self.dirty = false;
    }

    /// Add a zero-valued entry for the given field. Returns `false` without
    /// touching anything when the field already has a value in this session.
    pub fn add_field_entry(&mut self, field: &CustomField) -> bool {
        if self.existing_fields.contains(&field.id) {
            return false;
        }
        self.current.custom_field_entries.push(CustomFieldEntry {
            field: field.id,
            value: field.config.kind().zero_value(),
            comment: None,
        });
        self.existing_fields.insert(field.id);
        self.dirty = true;
        true
    }

    /// Replace the value/comment at `index`. An out-of-range index is a
    /// stale-index bug in the caller and panics.
    pub fn update_field_entry(&mut self, index: usize, value: FieldValue, comment: Option<String>) {
        let cfe = &mut self.current.custom_field_entries[index];
        cfe.value = value;
        cfe.comment = comment;
        self.dirty = true;
    }

    /// Remove the field entry at `index`, un-indexing its field id so the
    /// field becomes addable again.
    pub fn delete_field_entry(&mut self, index: usize) {
        let removed = self.current.custom_field_entries.remove(index);
        self.existing_fields.remove(&removed.field);
        self.dirty = true;
    }

    /// Append an empty text entry. Returns its client-local id (negative,
    /// timestamp-derived), replaced by a server id on the next save.
    pub fn add_text_entry(&mut self) -> i64 {
        let id = self.next_temp_text_id();
        self.current.text_entries.push(TextEntry {
            id,
            thought: String::new(),
            private: false,
        });
        self.dirty = true;
        id
    }

    fn next_temp_text_id(&self) -> i64 {
        let mut id = -Utc::now().timestamp_millis();
        while self.current.text_entries.iter().any(|te| te.id == id) {
            id -= 1;
        }
        id
    }

    pub fn update_text_entry(&mut self, index: usize, thought: String) {
        self.current.text_entries[index].thought = thought;
        self.dirty = true;
    }

    pub fn set_text_entry_private(&mut self, index: usize, private: bool) {
        self.current.text_entries[index].private = private;
        self.dirty = true;
    }

    pub fn delete_text_entry(&mut self, index: usize) {
        self.current.text_entries.remove(index);
        self.dirty = true;
    }

    pub fn toggle_tag(&mut self, tag_id: i64) {
        match self.current.tags.iter().position(|&t| t == tag_id) {
            Some(idx) => {
                self.current.tags.remove(idx);
            }
            None => self.current.tags.push(tag_id),
        }
        self.dirty = true;
    }

    /// Persist the working copy. Creates when the entry has never been
    /// saved, updates otherwise. On success both snapshots become the
    /// server's record, the field index is rebuilt and the entries cache is
    /// brought in line without a refetch. On failure the session stays
    /// dirty with edits preserved.
    pub async fn save(
        &mut self,
        backend: &impl Backend,
        entries: &mut Slice<Entry>,
    ) -> Result<SaveOutcome, ApiError> {
        if self.sending || self.deleting {
            return Ok(SaveOutcome::InFlight);
        }
        if !self.dirty {
            return Ok(SaveOutcome::Clean);
        }

        let was_new = self.current.is_new();
        self.sending = true;
        let result = if was_new {
            backend.create_entry(&self.current).await
        } else {
            backend.update_entry(&self.current).await
        };
        self.sending = false;

        match result {
            Ok(saved) => {
                self.original = saved.clone();
                self.current = saved;
                self.existing_fields = index_fields(&self.current);
                self.dirty = false;
                self.mode = SessionMode::Existing;

                if was_new || entries.get(self.current.id).is_none() {
                    entries.add_item(self.current.clone());
                } else {
                    entries.update_item(self.current.clone());
                }
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "entry save failed");
                Err(e)
            }
        }
    }

    /// Delete the entry server-side and drop it from the entries cache.
    /// The session is terminal afterwards; callers navigate away.
    pub async fn delete(
        &mut self,
        backend: &impl Backend,
        entries: &mut Slice<Entry>,
    ) -> Result<DeleteOutcome, ApiError> {
        if self.sending || self.deleting {
            return Ok(DeleteOutcome::InFlight);
        }
        if self.current.is_new() {
            return Ok(DeleteOutcome::NeverSaved);
        }

        self.deleting = true;
        let result = backend.delete_entry(self.current.id).await;
        self.deleting = false;

        match result {
            Ok(()) => {
                entries.remove_item(self.current.id);
                self.deleted = true;
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::warn!(error = %e, "entry delete failed");
                Err(e)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn mark_sending_for_test(&mut self) {
        self.sending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use chrono::TimeZone;
    use thoughts_api::domain::FieldConfig;
    use thoughts_api::ServerErrorKind;

    fn mood_field(id: i64) -> CustomField {
        CustomField {
            id,
            name: format!("field {}", id),
            config: FieldConfig::Integer {
                minimum: Some(1),
                maximum: Some(10),
            },
            comment: None,
            owner: 1,
            order: 0,
        }
    }

    fn assert_index_matches(session: &EntrySession) {
        let indexed: HashSet<i64> = session.existing_fields.clone();
        let present: HashSet<i64> = index_fields(session.current());
        assert_eq!(indexed, present);
    }

    #[test]
    fn field_index_tracks_add_and_delete() {
        let mut session = EntrySession::new_for_today(1);
        let field_a = mood_field(10);
        let field_b = mood_field(11);

        assert!(session.add_field_entry(&field_a));
        assert_index_matches(&session);

        // Second add for the same field is refused.
        assert!(!session.add_field_entry(&field_a));
        assert_eq!(session.current().custom_field_entries.len(), 1);

        assert!(session.add_field_entry(&field_b));
        assert_index_matches(&session);

        // Deleting by list index un-indexes by field id, so the field is
        // addable again.
        session.delete_field_entry(0);
        assert_index_matches(&session);
        assert!(!session.has_field_entry(10));
        assert!(session.add_field_entry(&field_a));
        assert_index_matches(&session);
    }

    #[test]
    fn dirty_tracks_every_mutation_and_reset() {
        let mut session = EntrySession::new_for_today(1);
        assert!(!session.is_dirty());

        session.add_text_entry();
        assert!(session.is_dirty());

        session.reset_to_original();
        assert!(!session.is_dirty());
        assert!(session.current().text_entries.is_empty());

        // Reset is idempotent and a no-op when clean.
        session.reset_to_original();
        assert!(!session.is_dirty());

        session.toggle_tag(5);
        assert!(session.is_dirty());
        assert_eq!(session.current().tags, vec![5]);
        session.toggle_tag(5);
        assert!(session.current().tags.is_empty());
    }

    #[test]
    fn reset_restores_the_original_snapshot() {
        let mut entry = Entry::new_for_today(1);
        entry.id = 40;
        entry.custom_field_entries.push(CustomFieldEntry {
            field: 10,
            value: FieldValue::Integer { value: 7 },
            comment: None,
        });
        let mut session = EntrySession::from_entry(entry);

        session.update_field_entry(0, FieldValue::Integer { value: 2 }, Some("bad".to_string()));
        session.delete_field_entry(0);
        assert!(!session.has_field_entry(10));

        session.reset_to_original();
        assert_eq!(
            session.current().custom_field_entries[0].value,
            FieldValue::Integer { value: 7 }
        );
        assert!(session.has_field_entry(10));
        assert_index_matches(&session);
    }

    #[test]
    fn new_text_entries_get_distinct_negative_ids() {
        let mut session = EntrySession::new_for_today(1);
        let a = session.add_text_entry();
        let b = session.add_text_entry();
        assert!(a < 0);
        assert!(b < 0);
        assert_ne!(a, b);

        session.update_text_entry(1, "second note".to_string());
        assert_eq!(session.current().text_entries[1].thought, "second note");
        session.set_text_entry_private(0, true);
        assert!(session.current().text_entries[0].private);

        session.delete_text_entry(0);
        assert_eq!(session.current().text_entries.len(), 1);
    }

    #[tokio::test]
    async fn save_of_new_entry_creates_and_adopts_the_server_id() {
        let backend = MockBackend::new();
        let mut entries = Slice::new();
        let mut session = EntrySession::new_for_today(1);

        session.add_text_entry();
        session.update_text_entry(0, "first".to_string());
        assert_eq!(session.current().id, 0);

        let outcome = session.save(&backend, &mut entries).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(backend.calls().create_entry, 1);
        assert_eq!(backend.calls().update_entry, 0);

        let id = session.current().id;
        assert_ne!(id, 0);
        assert!(!session.is_dirty());
        assert_eq!(session.mode(), SessionMode::Existing);
        // Temp text id replaced by a server id.
        assert!(session.current().text_entries[0].id > 0);
        // Cache slice picked up the new record without a refetch.
        assert!(entries.get(id).is_some());
    }

    #[tokio::test]
    async fn save_of_existing_entry_updates_in_place() {
        let mut entry = Entry::new_for_today(1);
        entry.id = 12;
        let backend = MockBackend::new().with_entries(vec![entry.clone()]);
        let mut entries = Slice::new();
        entries.add_item(entry);

        let mut session = EntrySession::load(&backend, 12).await.unwrap();
        session.toggle_tag(3);
        let outcome = session.save(&backend, &mut entries).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(backend.calls().update_entry, 1);
        assert_eq!(backend.calls().create_entry, 0);
        assert_eq!(session.current().id, 12);
        assert_eq!(entries.get(12).map(|e| e.tags.clone()), Some(vec![3]));
    }

    #[tokio::test]
    async fn clean_session_refuses_to_save() {
        let backend = MockBackend::new();
        let mut entries = Slice::new();
        let mut session = EntrySession::new_for_today(1);

        let outcome = session.save(&backend, &mut entries).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Clean);
        assert_eq!(backend.calls().create_entry, 0);
    }

    #[tokio::test]
    async fn second_save_while_in_flight_is_a_no_op() {
        let backend = MockBackend::new();
        let mut entries = Slice::new();
        let mut session = EntrySession::new_for_today(1);
        session.add_text_entry();

        session.mark_sending_for_test();
        let outcome = session.save(&backend, &mut entries).await.unwrap();
        assert_eq!(outcome, SaveOutcome::InFlight);
        assert_eq!(backend.calls().create_entry, 0);
    }

    #[tokio::test]
    async fn failed_save_preserves_edits_and_stays_dirty() {
        let backend = MockBackend::new();
        backend.set_fail_writes(true);
        let mut entries = Slice::new();
        let mut session = EntrySession::new_for_today(1);
        session.add_text_entry();
        session.update_text_entry(0, "keep me".to_string());

        let err = session.save(&backend, &mut entries).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(session.is_dirty());
        assert_eq!(session.current().text_entries[0].thought, "keep me");

        // The guard cleared; a retry goes through.
        backend.set_fail_writes(false);
        let outcome = session.save(&backend, &mut entries).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
    }

    #[tokio::test]
    async fn duplicate_day_creation_surfaces_entry_exists() {
        let day = Utc.with_ymd_and_hms(2023, 5, 17, 0, 0, 0).unwrap();
        let mut existing = Entry::new_for_today(1);
        existing.id = 8;
        existing.day = day;
        let backend = MockBackend::new().with_entries(vec![existing]);

        let mut fresh = Entry::new_for_today(1);
        fresh.day = day;
        let mut session = EntrySession::from_entry(fresh);
        session.add_text_entry();

        let mut entries = Slice::new();
        let err = session.save(&backend, &mut entries).await.unwrap_err();
        assert_eq!(err.server_kind(), Some(&ServerErrorKind::EntryExists));
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn delete_removes_from_cache_and_terminates_the_session() {
        let mut entry = Entry::new_for_today(1);
        entry.id = 30;
        let backend = MockBackend::new().with_entries(vec![entry.clone()]);
        let mut entries = Slice::new();
        entries.add_item(entry);

        let mut session = EntrySession::load(&backend, 30).await.unwrap();
        let outcome = session.delete(&backend, &mut entries).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(session.is_deleted());
        assert!(entries.get(30).is_none());
        assert!(backend.entries().is_empty());
    }

    #[tokio::test]
    async fn delete_of_unsaved_entry_is_refused() {
        let backend = MockBackend::new();
        let mut entries = Slice::new();
        let mut session = EntrySession::new_for_today(1);

        let outcome = session.delete(&backend, &mut entries).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NeverSaved);
        assert_eq!(backend.calls().delete_entry, 0);
    }

    #[test]
    #[should_panic]
    fn out_of_range_update_is_a_stale_index_bug() {
        let mut session = EntrySession::new_for_today(1);
        session.update_field_entry(0, FieldValue::Integer { value: 1 }, None);
    }
}
