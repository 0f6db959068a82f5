//! Domain types for the snippet store.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Unique identifier for a snippet, assigned by the store.
pub type SnippetId = i64;

/// Expiry choices offered by the create form, in days.
pub const EXPIRY_CHOICES: [i64; 3] = [1, 7, 365];

/// A persisted text snippet with a bounded lifetime.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    pub content: String,
    /// UTC instant the row was inserted.
    pub created: DateTime<Utc>,
    /// UTC instant after which the snippet is no longer visible.
    pub expires: DateTime<Utc>,
}

impl Snippet {
    /// Whether the snippet is still visible at `now`.
    #[cfg(test)]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }
}
