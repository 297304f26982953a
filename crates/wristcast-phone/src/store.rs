//! SQLite weather record store.
//!
//! One row per (day, location). The original system's sync adapter
//! kept this table fresh; here the daemon's `--seed` flag stands in.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A weather record row for one day at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub condition_id: i64,
    pub max_temp: f64,
    pub min_temp: f64,
}

/// SQLite-backed weather store.
pub struct WeatherStore {
    conn: Connection,
}

impl WeatherStore {
    /// Open (or create) the weather database at the given path.
    ///
    /// Creates the table if it doesn't exist and sets WAL journal mode.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS weather (
                day          TEXT NOT NULL,
                location     TEXT NOT NULL,
                condition_id INTEGER NOT NULL,
                max_temp     REAL NOT NULL,
                min_temp     REAL NOT NULL,
                PRIMARY KEY (day, location)
            );",
        )?;

        Ok(Self { conn })
    }

    /// Insert or replace the record for a day at a location.
    pub fn upsert(&self, day: &str, location: &str, record: &WeatherRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO weather (day, location, condition_id, max_temp, min_temp) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                day,
                location,
                record.condition_id,
                record.max_temp,
                record.min_temp
            ],
        )?;
        Ok(())
    }

    /// Look up the record for a day at a location, if any.
    pub fn for_day(&self, location: &str, day: &str) -> Result<Option<WeatherRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT condition_id, max_temp, min_temp FROM weather \
                 WHERE day = ?1 AND location = ?2",
                params![day, location],
                |row| {
                    Ok(WeatherRecord {
                        condition_id: row.get(0)?,
                        max_temp: row.get(1)?,
                        min_temp: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_store() -> (tempfile::TempDir, WeatherStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = WeatherStore::open(&dir.path().join("weather.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn upsert_and_query_round_trip() {
        let (_dir, store) = open_temp_store();
        let record = WeatherRecord {
            condition_id: 800,
            max_temp: 25.0,
            min_temp: 10.0,
        };
        store.upsert("2026-08-06", "94043", &record).unwrap();

        let found = store.for_day("94043", "2026-08-06").unwrap();
        assert_eq!(found, Some(record));
    }

    #[test]
    fn missing_record_is_none() {
        let (_dir, store) = open_temp_store();
        assert_eq!(store.for_day("94043", "2026-08-06").unwrap(), None);
    }

    #[test]
    fn upsert_replaces_same_day_and_location() {
        let (_dir, store) = open_temp_store();
        let first = WeatherRecord {
            condition_id: 500,
            max_temp: 18.0,
            min_temp: 9.0,
        };
        let second = WeatherRecord {
            condition_id: 800,
            max_temp: 21.0,
            min_temp: 11.0,
        };
        store.upsert("2026-08-06", "94043", &first).unwrap();
        store.upsert("2026-08-06", "94043", &second).unwrap();

        let found = store.for_day("94043", "2026-08-06").unwrap();
        assert_eq!(found, Some(second));
    }

    #[test]
    fn locations_are_isolated() {
        let (_dir, store) = open_temp_store();
        let record = WeatherRecord {
            condition_id: 600,
            max_temp: 2.0,
            min_temp: -5.0,
        };
        store.upsert("2026-08-06", "10001", &record).unwrap();
        assert_eq!(store.for_day("94043", "2026-08-06").unwrap(), None);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data/nested/weather.db");
        let store = WeatherStore::open(&nested).unwrap();
        assert_eq!(store.for_day("94043", "2026-08-06").unwrap(), None);
    }
}
