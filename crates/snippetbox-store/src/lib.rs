//! snippetbox-store: snippet persistence for Snippetbox.
//!
//! Backed by [sqlx](https://docs.rs/sqlx) over SQLite, provides the three
//! data-access operations the web layer needs: insert, get-by-id, and
//! list-latest.
//!
//! # Architecture
//!
//! Every operation is a single parameterized, autocommit statement. Expiry
//! is filtered in the same statement as the lookup, so an expired row is
//! never returned. Rows are never deleted.
//!
//! The `SnippetStore` is `Clone` + `Send` + `Sync` (backed by a pool) and
//! can be shared across async tasks.

pub mod error;
pub mod schema;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use store::{DEFAULT_LATEST_LIMIT, SnippetStore};
pub use types::*;
