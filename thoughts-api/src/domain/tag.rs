use serde::{Deserialize, Serialize};

/// A label entries can be filed under, rendered with `color` in lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub title: String,
    pub color: String,
    pub comment: Option<String>,
    pub owner: i64,
}
