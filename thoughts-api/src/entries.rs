use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Entry, FieldValue};
use crate::{ApiError, EntryQuery, Scope, ThoughtsClient};

/// Write payload for `POST /entries` and `PUT /entries/:id`. Client-local
/// text entries (negative ids) are sent with `id: null` so the server
/// assigns real ids.
#[derive(Debug, Serialize)]
struct ComposedEntry<'a> {
    day: &'a DateTime<Utc>,
    tags: &'a [i64],
    custom_field_entries: Vec<ComposedFieldEntry<'a>>,
    text_entries: Vec<ComposedTextEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ComposedFieldEntry<'a> {
    field: i64,
    value: &'a FieldValue,
    comment: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ComposedTextEntry<'a> {
    id: Option<i64>,
    thought: &'a str,
    private: bool,
}

fn compose(entry: &Entry) -> ComposedEntry<'_> {
    ComposedEntry {
        day: &entry.day,
        tags: &entry.tags,
        custom_field_entries: entry
            .custom_field_entries
            .iter()
            .map(|cfe| ComposedFieldEntry {
                field: cfe.field,
                value: &cfe.value,
                comment: cfe.comment.as_deref(),
            })
            .collect(),
        text_entries: entry
            .text_entries
            .iter()
            .map(|te| ComposedTextEntry {
                id: (te.id > 0).then_some(te.id),
                thought: &te.thought,
                private: te.private,
            })
            .collect(),
    }
}

impl ThoughtsClient {
    pub async fn fetch_entries(
        &self,
        scope: Scope,
        query: &EntryQuery,
    ) -> Result<Vec<Entry>, ApiError> {
        let url = self
            .url()
            .append_scoped(scope, "entries")
            .with_entry_query(query);
        self.get_json(url).await
    }

    pub async fn fetch_entry(&self, id: i64) -> Result<Entry, ApiError> {
        let url = self.url().append_path(&format!("entries/{}", id));
        self.get_json(url).await
    }

    pub async fn create_entry(&self, entry: &Entry) -> Result<Entry, ApiError> {
        let url = self.url().append_path("entries");
        self.post_json(url, &compose(entry)).await
    }

    pub async fn update_entry(&self, entry: &Entry) -> Result<Entry, ApiError> {
        let url = self.url().append_path(&format!("entries/{}", entry.id));
        self.put_json(url, &compose(entry)).await
    }

    pub async fn delete_entry(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url().append_path(&format!("entries/{}", id));
        self.delete(url).await
    }
}
