//! `SQLite` implementation of [`SettingsStore`].
//!
//! Settings are stored one row per key, under the same camelCase keys the
//! settings form uses. A missing key reads as its default.

use std::future::Future;

use sqlx::SqlitePool;

use chatmote_app::ports::SettingsStore;
use chatmote_domain::error::ChatmoteError;
use chatmote_domain::settings::Settings;

use crate::error::StorageError;

const MIN_REPETITIONS: &str = "minRepetitions";
const MAX_REPETITIONS: &str = "maxRepetitions";
const MIN_DELAY: &str = "minDelay";
const MAX_DELAY: &str = "maxDelay";

const SELECT_ALL: &str = "SELECT key, value FROM settings";
const UPSERT: &str = "INSERT INTO settings (key, value) VALUES (?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
const INSERT_IF_MISSING: &str = "INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)";

fn rows(settings: &Settings) -> [(&'static str, i64); 4] {
    [
        (MIN_REPETITIONS, i64::from(settings.min_repetitions)),
        (MAX_REPETITIONS, i64::from(settings.max_repetitions)),
        (MIN_DELAY, i64::try_from(settings.min_delay_ms).unwrap_or(i64::MAX)),
        (MAX_DELAY, i64::try_from(settings.max_delay_ms).unwrap_or(i64::MAX)),
    ]
}

fn apply(settings: &mut Settings, key: &str, value: i64) -> Result<(), StorageError> {
    let out_of_range = || StorageError::OutOfRange {
        key: key.to_string(),
        value,
    };
    match key {
        MIN_REPETITIONS => {
            settings.min_repetitions = u32::try_from(value).map_err(|_| out_of_range())?;
        }
        MAX_REPETITIONS => {
            settings.max_repetitions = u32::try_from(value).map_err(|_| out_of_range())?;
        }
        MIN_DELAY => {
            settings.min_delay_ms = u64::try_from(value).map_err(|_| out_of_range())?;
        }
        MAX_DELAY => {
            settings.max_delay_ms = u64::try_from(value).map_err(|_| out_of_range())?;
        }
        other => tracing::debug!(key = other, "ignoring unknown settings key"),
    }
    Ok(())
}

/// `SQLite`-backed settings store.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Seed the default value of every key that has never been written.
    ///
    /// Existing values are left untouched, so this is safe to run on every
    /// start.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the transaction fails.
    pub async fn install_defaults(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in rows(&Settings::default()) {
            sqlx::query(INSERT_IF_MISSING)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::debug!("default settings installed");
        Ok(())
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> impl Future<Output = Result<Settings, ChatmoteError>> + Send {
        let pool = self.pool.clone();
        async move {
            let stored: Vec<(String, i64)> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let mut settings = Settings::default();
            for (key, value) in stored {
                apply(&mut settings, &key, value)?;
            }
            Ok(settings)
        }
    }

    fn save(&self, settings: Settings) -> impl Future<Output = Result<(), ChatmoteError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            for (key, value) in rows(&settings) {
                sqlx::query(UPSERT)
                    .bind(key)
                    .bind(value)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
            }
            tx.commit().await.map_err(StorageError::from)?;
            tracing::info!(?settings, "settings saved");
            Ok(())
        }
    }
}
