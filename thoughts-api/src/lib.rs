mod auth;
mod client;
mod custom_fields;
mod entries;
mod tags;
mod thoughts_url;
mod users;

pub mod domain;

pub(crate) use thoughts_url::ThoughtsUrl;

pub use client::{ApiError, ResponseEnvelope, ServerErrorKind, ThoughtsClient};
pub use custom_fields::NewCustomField;
pub use tags::NewTag;
pub use thoughts_url::{EntryQuery, Scope};
