//! Durable payload storage contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow load/save seam the comment store persists through.
//! - Provide the production SQLite-backed implementation.
//!
//! # Invariants
//! - One storage instance maps to exactly one named payload row.
//! - `try_new` rejects connections whose schema was not migrated.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default payload row name used by the application.
pub const DEFAULT_DOCUMENT_NAME: &str = "scene_comments";

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable read/write failures surfaced to the store.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Connection was handed over without migrations applied.
    Uninitialized {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Non-SQLite backend failure (quota, disk full, test doubles).
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Uninitialized {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Narrow persistence seam for the serialized comment document.
pub trait DocumentStorage {
    /// Reads the stored payload, `None` when nothing was persisted yet.
    fn load_payload(&self) -> StorageResult<Option<String>>;
    /// Writes (inserts or replaces) the full payload.
    fn save_payload(&self, payload: &str) -> StorageResult<()>;
}

/// SQLite-backed storage: one row in `documents` per store name.
pub struct SqliteDocumentStorage<'conn> {
    conn: &'conn Connection,
    name: String,
}

impl<'conn> SqliteDocumentStorage<'conn> {
    /// Binds to the default document row after verifying the schema.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        Self::try_with_name(conn, DEFAULT_DOCUMENT_NAME)
    }

    /// Binds to a named document row after verifying the schema.
    pub fn try_with_name(conn: &'conn Connection, name: &str) -> StorageResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version < expected_version {
            return Err(StorageError::Uninitialized {
                expected_version,
                actual_version,
            });
        }

        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='documents');",
            [],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Err(StorageError::MissingRequiredTable("documents"));
        }

        Ok(Self {
            conn,
            name: name.to_string(),
        })
    }
}

impl DocumentStorage for SqliteDocumentStorage<'_> {
    fn load_payload(&self) -> StorageResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM documents WHERE name = ?1;",
                params![self.name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn save_payload(&self, payload: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO documents (name, payload, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(name) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![self.name, payload],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStorage, SqliteDocumentStorage, StorageError};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn load_returns_none_before_first_save() {
        let conn = open_db_in_memory().unwrap();
        let storage = SqliteDocumentStorage::try_new(&conn).unwrap();
        assert!(storage.load_payload().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips_payload() {
        let conn = open_db_in_memory().unwrap();
        let storage = SqliteDocumentStorage::try_new(&conn).unwrap();
        storage.save_payload("{\"comments\":{}}").unwrap();
        storage.save_payload("{\"comments\":{\"A\":[]}}").unwrap();
        assert_eq!(
            storage.load_payload().unwrap().as_deref(),
            Some("{\"comments\":{\"A\":[]}}")
        );
    }

    #[test]
    fn named_rows_are_independent() {
        let conn = open_db_in_memory().unwrap();
        let first = SqliteDocumentStorage::try_with_name(&conn, "a").unwrap();
        let second = SqliteDocumentStorage::try_with_name(&conn, "b").unwrap();
        first.save_payload("one").unwrap();
        assert!(second.load_payload().unwrap().is_none());
    }

    #[test]
    fn rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqliteDocumentStorage::try_new(&conn);
        assert!(matches!(
            result,
            Err(StorageError::Uninitialized {
                actual_version: 0,
                ..
            })
        ));
    }
}
