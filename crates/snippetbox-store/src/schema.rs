//! SQL schema for the snippet store.
//!
//! Timestamps are stored as sqlx-encoded `DateTime<Utc>` text truncated to
//! whole seconds, so lexicographic order equals chronological order.

/// The `snippets` table.
pub const CREATE_SNIPPETS: &str = "CREATE TABLE IF NOT EXISTS snippets (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    title   TEXT NOT NULL,
    content TEXT NOT NULL,
    created TEXT NOT NULL,
    expires TEXT NOT NULL
)";

/// Expiry filter index used by every read.
pub const CREATE_EXPIRES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_snippets_expires ON snippets (expires)";

pub const INSERT_SNIPPET: &str =
    "INSERT INTO snippets (title, content, created, expires) VALUES (?, ?, ?, ?)";

pub const SELECT_SNIPPET: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > ? AND id = ?";

pub const SELECT_LATEST: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > ? ORDER BY id DESC LIMIT ?";
