//! # chatmote-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`SettingsStore`](chatmote_app::ports::SettingsStore) port
//! - Manage the `SQLite` connection pool lifecycle
//! - Run the embedded migrations
//! - Seed default settings on first install without overwriting user values
//!
//! ## Dependency rule
//! Depends on `chatmote-app` (for port traits) and `chatmote-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod settings_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use settings_store::SqliteSettingsStore;
