//! SnippetStore: sqlx-backed snippet persistence.
//!
//! Provides insert, get-by-id, and latest-N over the `snippets` table. The
//! store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::str::FromStr;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::schema::*;
use crate::types::*;

/// Number of snippets shown on the home page.
pub const DEFAULT_LATEST_LIMIT: u32 = 10;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Thread-safe snippet store backed by an SQLite connection pool.
#[derive(Clone)]
pub struct SnippetStore {
    pool: SqlitePool,
}

impl SnippetStore {
    /// Connect to the database named by `dsn`, creating it if missing.
    pub async fn connect(dsn: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(dsn)
            .map_err(map_err!(Open))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(map_err!(Open))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        debug!(%dsn, "snippet store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    ///
    /// Each SQLite connection owns a private in-memory database, so the pool
    /// is pinned to one connection that is never recycled.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_err!(Open))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(map_err!(Open))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        debug!("in-memory snippet store opened");
        Ok(store)
    }

    /// Create the table and index if they don't exist yet.
    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_SNIPPETS)
            .execute(&self.pool)
            .await
            .map_err(map_err!(Migrate))?;
        sqlx::query(CREATE_EXPIRES_INDEX)
            .execute(&self.pool)
            .await
            .map_err(map_err!(Migrate))?;
        Ok(())
    }

    /// The underlying pool.
    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ── Writes ─────────────────────────────────────────────────────

    /// Insert a new snippet expiring `expiry_days` from now. Returns its id.
    pub async fn insert(
        &self,
        title: &str,
        content: &str,
        expiry_days: i64,
    ) -> StoreResult<SnippetId> {
        self.insert_at(Utc::now(), title, content, expiry_days).await
    }

    /// Insert a new snippet as if the current time were `now`.
    pub async fn insert_at(
        &self,
        now: DateTime<Utc>,
        title: &str,
        content: &str,
        expiry_days: i64,
    ) -> StoreResult<SnippetId> {
        let created = now.trunc_subsecs(0);
        let expires = TimeDelta::try_days(expiry_days)
            .and_then(|delta| created.checked_add_signed(delta))
            .ok_or(StoreError::ExpiryOutOfRange(expiry_days))?;

        let result = sqlx::query(INSERT_SNIPPET)
            .bind(title)
            .bind(content)
            .bind(created)
            .bind(expires)
            .execute(&self.pool)
            .await
            .map_err(map_err!(Write))?;

        let id = result.last_insert_rowid();
        debug!(id, expiry_days, "snippet stored");
        Ok(id)
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Get a non-expired snippet by id.
    pub async fn get(&self, id: SnippetId) -> StoreResult<Snippet> {
        self.get_at(Utc::now(), id).await
    }

    /// Get a snippet by id if it has not expired at `now`.
    pub async fn get_at(&self, now: DateTime<Utc>, id: SnippetId) -> StoreResult<Snippet> {
        sqlx::query_as::<_, Snippet>(SELECT_SNIPPET)
            .bind(now.trunc_subsecs(0))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err!(Read))?
            .ok_or(StoreError::NotFound(id))
    }

    /// List up to `limit` non-expired snippets, newest id first.
    pub async fn latest(&self, limit: u32) -> StoreResult<Vec<Snippet>> {
        self.latest_at(Utc::now(), limit).await
    }

    /// List up to `limit` snippets not expired at `now`, newest id first.
    ///
    /// A failure on any row fails the whole call; the result is never a
    /// silently truncated list.
    pub async fn latest_at(&self, now: DateTime<Utc>, limit: u32) -> StoreResult<Vec<Snippet>> {
        sqlx::query_as::<_, Snippet>(SELECT_LATEST)
            .bind(now.trunc_subsecs(0))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(map_err!(Read))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SnippetStore {
        SnippetStore::open_in_memory().await.unwrap()
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    // ── Insert / get ───────────────────────────────────────────────

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let store = test_store().await;
        let title = "O snail";
        let content = "Climb Mount Fuji,\nBut slowly, slowly!\n\n– Kobayashi Issa";

        let id = store.insert(title, content, 7).await.unwrap();
        let snippet = store.get(id).await.unwrap();

        assert_eq!(snippet.id, id);
        assert_eq!(snippet.title, title);
        assert_eq!(snippet.content, content);
        assert_eq!(snippet.expires - snippet.created, TimeDelta::days(7));
        assert_eq!(snippet.created.timestamp_subsec_nanos(), 0);
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = test_store().await;
        let a = store.insert("a", "first", 1).await.unwrap();
        let b = store.insert("b", "second", 1).await.unwrap();
        let c = store.insert("c", "third", 1).await.unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn insert_does_not_validate_input() {
        let store = test_store().await;
        let id = store.insert("", "", 2).await.unwrap();
        let snippet = store.get(id).await.unwrap();
        assert_eq!(snippet.title, "");
        assert_eq!(snippet.expires - snippet.created, TimeDelta::days(2));
    }

    #[tokio::test]
    async fn insert_rejects_unrepresentable_expiry() {
        let store = test_store().await;
        let err = store.insert("t", "c", i64::MAX).await.unwrap_err();
        assert!(matches!(err, StoreError::ExpiryOutOfRange(i64::MAX)));
    }

    #[tokio::test]
    async fn get_nonexistent_returns_not_found() {
        let store = test_store().await;
        let err = store.get(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no matching snippet: 42");
    }

    // ── Expiry ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn expired_snippet_is_hidden_from_get_and_latest() {
        let store = test_store().await;
        let created = at("2024-03-01T12:00:00Z");
        let id = store.insert_at(created, "short", "lived", 1).await.unwrap();

        let before = at("2024-03-02T11:59:59Z");
        assert!(store.get_at(before, id).await.unwrap().is_live_at(before));
        assert_eq!(store.latest_at(before, 10).await.unwrap().len(), 1);

        // Visibility ends exactly at the expiry instant.
        let boundary = at("2024-03-02T12:00:00Z");
        assert!(store.get_at(boundary, id).await.unwrap_err().is_not_found());
        assert!(store.latest_at(boundary, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snippet_expired_at_insert_time_is_never_visible() {
        let store = test_store().await;
        let id = store.insert("gone", "already", -1).await.unwrap();
        assert!(store.get(id).await.unwrap_err().is_not_found());
        assert!(store.latest(10).await.unwrap().is_empty());
    }

    // ── Latest ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn latest_orders_by_descending_id_and_respects_limit() {
        let store = test_store().await;
        for i in 0..12 {
            store.insert(&format!("title {i}"), "body", 365).await.unwrap();
        }

        let latest = store.latest(DEFAULT_LATEST_LIMIT).await.unwrap();
        assert_eq!(latest.len(), 10);
        assert!(latest.windows(2).all(|w| w[0].id > w[1].id));
        assert_eq!(latest[0].title, "title 11");

        assert_eq!(store.latest(3).await.unwrap().len(), 3);
        assert!(store.latest(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_skips_expired_rows_between_live_ones() {
        let store = test_store().await;
        let now = at("2025-01-10T00:00:00Z");
        let old = now - TimeDelta::days(3);

        let a = store.insert_at(now, "a", "live", 7).await.unwrap();
        store.insert_at(old, "b", "expired", 1).await.unwrap();
        let c = store.insert_at(now, "c", "live", 7).await.unwrap();

        let ids: Vec<_> = store.latest_at(now, 10).await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![c, a]);
    }

    #[tokio::test]
    async fn latest_surfaces_row_decode_failure() {
        let store = test_store().await;
        store.insert("fine", "row", 7).await.unwrap();
        sqlx::query("INSERT INTO snippets (title, content, created, expires) VALUES ('bad', 'row', 'not a date', '9999-12-31T00:00:00+00:00')")
            .execute(store.pool())
            .await
            .unwrap();

        let err = store.latest(10).await.unwrap_err();
        assert!(matches!(err, StoreError::Read(_)));
    }

    // ── On-disk ────────────────────────────────────────────────────

    #[tokio::test]
    async fn on_disk_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let dsn = format!("sqlite://{}", dir.path().join("snippetbox.db").display());

        let store = SnippetStore::connect(&dsn).await.unwrap();
        let id = store.insert("kept", "on disk", 365).await.unwrap();
        store.close().await;

        let reopened = SnippetStore::connect(&dsn).await.unwrap();
        assert_eq!(reopened.get(id).await.unwrap().title, "kept");
    }

    #[tokio::test]
    async fn connect_fails_when_parent_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let dsn = format!("sqlite://{}", dir.path().join("missing/dir/snippetbox.db").display());
        let err = SnippetStore::connect(&dsn).await.err().unwrap();
        assert!(matches!(err, StoreError::Open(_)));
    }
}
