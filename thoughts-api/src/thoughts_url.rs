use chrono::{DateTime, Utc};

/// Selects between the caller's own resources (`/entries`) and the read-only
/// cross-user variant (`/users/:id/entries`). Always passed explicitly so the
/// client stays a pure function of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Own,
    User(i64),
}

impl Scope {
    fn path_prefix(&self) -> String {
        match self {
            Scope::Own => String::new(),
            Scope::User(id) => format!("/users/{}", id),
        }
    }
}

/// Date window for list endpoints. Bounds are sent as unix seconds; absent
/// bounds are omitted from the query string entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EntryQuery {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }
}

#[derive(Debug)]
pub struct ThoughtsUrl(String);

impl AsRef<str> for ThoughtsUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ThoughtsUrl {
    pub fn new(base: &str) -> Self {
        Self(base.trim_end_matches('/').to_string())
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    /// Append a path under the given scope, e.g. `/entries` vs
    /// `/users/5/entries`.
    pub fn append_scoped(&self, scope: Scope, path: &str) -> Self {
        let prefix = scope.path_prefix();
        if prefix.is_empty() {
            self.append_path(path)
        } else {
            self.append_path(&prefix).append_path(path)
        }
    }

    fn with_param(&self, key: &str, value: impl std::fmt::Display) -> Self {
        if self.0.contains('?') {
            Self(format!("{}&{}={}", self.0, key, value))
        } else {
            Self(format!("{}?{}={}", self.0, key, value))
        }
    }

    pub fn with_entry_query(&self, query: &EntryQuery) -> Self {
        let mut url = Self(self.0.clone());
        if let Some(from) = query.from {
            url = url.with_param("from", from.timestamp());
        }
        if let Some(to) = query.to {
            url = url.with_param("to", to.timestamp());
        }
        url
    }
}
