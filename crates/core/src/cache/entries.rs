//! Entry CRUD operations within a partition.
//!
//! Entries are addressed by partition name and request URL; the method is
//! always `GET`. Writes replace the whole entry.

use super::connection::CacheDb;
use super::hash::{CACHE_METHOD, compute_cache_key};
use super::partitions::ensure_partition;
use super::response::ResponseSnapshot;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

fn insert_entry(conn: &rusqlite::Connection, partition: &str, snapshot: &ResponseSnapshot) -> Result<(), Error> {
    if !snapshot.is_success() {
        return Err(Error::InvalidInput(format!(
            "refusing to cache status {} for {}",
            snapshot.status, snapshot.url
        )));
    }

    let headers_json =
        serde_json::to_string(&snapshot.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;

    ensure_partition(conn, partition)?;
    conn.execute(
        "INSERT INTO entries (partition, key_hash, method, url, status_code, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(partition, key_hash) DO UPDATE SET
             url = excluded.url,
             status_code = excluded.status_code,
             headers_json = excluded.headers_json,
             body = excluded.body,
             stored_at = excluded.stored_at",
        params![
            partition,
            compute_cache_key(CACHE_METHOD, &snapshot.url),
            CACHE_METHOD,
            &snapshot.url,
            snapshot.status,
            headers_json,
            &snapshot.body,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn snapshot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, u16, String, Vec<u8>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode((url, status, headers_json, body): (String, u16, String, Vec<u8>)) -> Result<ResponseSnapshot, Error> {
    let headers = serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
    Ok(ResponseSnapshot { url, status, headers, body })
}

fn lookup(conn: &rusqlite::Connection, partition: &str, key: &str) -> Result<Option<ResponseSnapshot>, Error> {
    conn.query_row(
        "SELECT url, status_code, headers_json, body FROM entries WHERE partition = ?1 AND key_hash = ?2",
        params![partition, key],
        snapshot_from_row,
    )
    .optional()?
    .map(decode)
    .transpose()
}

impl CacheDb {
    /// Store a snapshot, creating the partition if needed.
    ///
    /// Only 2xx snapshots are accepted; anything else is rejected with
    /// `Error::InvalidInput`.
    pub async fn put(&self, partition: &str, snapshot: &ResponseSnapshot) -> Result<(), Error> {
        let partition = partition.to_string();
        let snapshot = snapshot.clone();
        self.conn
            .call(move |conn| insert_entry(conn, &partition, &snapshot))
            .await
            .map_err(Error::from)
    }

    /// Store several snapshots in one transaction.
    ///
    /// Either every snapshot is written and the partition exists afterwards,
    /// or nothing changes.
    pub async fn put_all(&self, partition: &str, snapshots: Vec<ResponseSnapshot>) -> Result<(), Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_partition(&tx, &partition)?;
                for snapshot in &snapshots {
                    insert_entry(&tx, &partition, snapshot)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a URL in a single partition.
    pub async fn match_in(&self, partition: &str, url: &str) -> Result<Option<ResponseSnapshot>, Error> {
        let partition = partition.to_string();
        let key = compute_cache_key(CACHE_METHOD, url);
        self.conn
            .call(move |conn| lookup(conn, &partition, &key))
            .await
            .map_err(Error::from)
    }

    /// Look up a URL in each partition in turn.
    ///
    /// Returns the name of the first partition holding the URL together
    /// with its snapshot. Partitions not listed are never consulted.
    pub async fn match_first(
        &self, partitions: &[String], url: &str,
    ) -> Result<Option<(String, ResponseSnapshot)>, Error> {
        let partitions = partitions.to_vec();
        let key = compute_cache_key(CACHE_METHOD, url);
        self.conn
            .call(move |conn| -> Result<Option<(String, ResponseSnapshot)>, Error> {
                for partition in partitions {
                    if let Some(snapshot) = lookup(conn, &partition, &key)? {
                        return Ok(Some((partition, snapshot)));
                    }
                }
                Ok(None)
            })
            .await
            .map_err(Error::from)
    }

    /// List the URLs stored in a partition, oldest write first.
    pub async fn keys(&self, partition: &str) -> Result<Vec<String>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE partition = ?1 ORDER BY stored_at, rowid")?;
                let urls = stmt
                    .query_map(params![partition], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Load every snapshot in a partition, oldest write first.
    ///
    /// Rows that fail to decode are skipped with a warning.
    pub async fn entries(&self, partition: &str) -> Result<Vec<ResponseSnapshot>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<ResponseSnapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status_code, headers_json, body FROM entries
                     WHERE partition = ?1 ORDER BY stored_at, rowid",
                )?;
                let rows = stmt
                    .query_map(params![partition], snapshot_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                let snapshots = rows
                    .into_iter()
                    .filter_map(|row| match decode(row) {
                        Ok(snapshot) => Some(snapshot),
                        Err(e) => {
                            tracing::warn!(partition = %partition, error = %e, "skipping undecodable entry");
                            None
                        }
                    })
                    .collect();
                Ok(snapshots)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one entry. Returns false if it was not present.
    pub async fn delete(&self, partition: &str, url: &str) -> Result<bool, Error> {
        let partition = partition.to_string();
        let key = compute_cache_key(CACHE_METHOD, url);
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM entries WHERE partition = ?1 AND key_hash = ?2",
                    params![partition, key],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a partition.
    pub async fn count(&self, partition: &str) -> Result<u64, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE partition = ?1", params![partition], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
