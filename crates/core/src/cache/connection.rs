//! Opening the cache database.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

/// Pragmas applied to every connection. `foreign_keys` is required for
/// partition deletion to cascade to its entries.
const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Clones share the same connection, so all
/// partitions are reached through one serialized writer.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open (or create) the database file and bring its schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        tracing::debug!(path = %path.display(), "opened cache database");
        Self::prepare(conn).await
    }

    /// In-memory database. Each call gets an independent store.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| conn.execute_batch(PRAGMAS))
            .await
            .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Drop the cache tables so every later read and write fails.
    #[cfg(any(test, feature = "test-util"))]
    #[doc(hidden)]
    pub async fn drop_tables(&self) -> Result<(), Error> {
        self.conn
            .call(|conn| conn.execute_batch("DROP TABLE entries; DROP TABLE partitions;"))
            .await
            .map_err(Error::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let foreign_keys: i64 = db
            .conn
            .call(|conn| conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[tokio::test]
    async fn test_dropped_tables_fail_reads() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.drop_tables().await.unwrap();

        assert!(db.match_first(&["app-static-v1".to_string()], "https://app.test/").await.is_err());
    }

    #[tokio::test]
    async fn test_open_file_persists_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");

        {
            let db = CacheDb::open(&path).await.unwrap();
            db.open_partition("app-static-v1").await.unwrap();
        }

        let db = CacheDb::open(&path).await.unwrap();
        assert!(db.has_partition("app-static-v1").await.unwrap());
    }
}
