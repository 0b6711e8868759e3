use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FieldValue;

/// A value recorded for one custom field on one entry. The field id is the
/// entry-local identity: an entry holds at most one value per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldEntry {
    pub field: i64,
    pub value: FieldValue,
    pub comment: Option<String>,
}

/// A free-text note on an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntry {
    pub id: i64,
    pub thought: String,
    pub private: bool,
}

/// A named marker on an entry, shown alongside graphed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: i64,
    pub title: String,
    pub comment: Option<String>,
}

/// One day's record: text notes, field values, tags and markers. `day` is
/// unique per owner; the server rejects a second entry for the same day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub day: DateTime<Utc>,
    pub owner: i64,
    pub tags: Vec<i64>,
    pub markers: Vec<Marker>,
    pub custom_field_entries: Vec<CustomFieldEntry>,
    pub text_entries: Vec<TextEntry>,
}

impl Entry {
    /// An unsaved entry dated today. Id 0 marks it as not yet created
    /// server-side; a successful save replaces it with the assigned id.
    pub fn new_for_today(owner: i64) -> Self {
        let day = Utc::now()
            .date_naive()
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        Self {
            id: 0,
            day,
            owner,
            tags: Vec::new(),
            markers: Vec::new(),
            custom_field_entries: Vec::new(),
            text_entries: Vec::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// The value recorded for the given field, if any.
    pub fn field_entry(&self, field_id: i64) -> Option<&CustomFieldEntry> {
        self.custom_field_entries
            .iter()
            .find(|cfe| cfe.field == field_id)
    }
}
