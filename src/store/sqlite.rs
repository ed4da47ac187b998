use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{ResourceStore, StoreError};
use crate::models::ResourceKind;

/// Single-table schema: one row per resource, with an AUTOINCREMENT
/// sequence providing the creation-order guarantee for `list`.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);

    CREATE TABLE IF NOT EXISTS resources (
        seq         INTEGER PRIMARY KEY AUTOINCREMENT,
        subject_id  TEXT NOT NULL,
        kind        TEXT NOT NULL,
        id          TEXT NOT NULL,
        body        BLOB NOT NULL,
        created_at  TEXT NOT NULL,
        UNIQUE(subject_id, kind, id)
    );

    CREATE INDEX IF NOT EXISTS idx_resources_partition
        ON resources(subject_id, kind, seq);
";

/// SQLite-backed resource store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(to_store_error)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(to_store_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(to_store_error)?;
        run_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn with_conn<R>(
        &self,
        timeout: Duration,
        f: impl FnOnce(&Connection) -> Result<R, rusqlite::Error>,
    ) -> Result<R, StoreError> {
        let conn = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        conn.busy_timeout(timeout).map_err(to_store_error)?;
        f(&conn).map_err(|e| classify(e, timeout))
    }
}

fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let version: i64 = conn
        .query_row("SELECT IFNULL(MAX(version), 0) FROM schema_version", [], |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        tracing::info!("running resource store migration v1");
        conn.execute_batch(SCHEMA).map_err(to_store_error)?;
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])
            .map_err(to_store_error)?;
    }
    Ok(())
}

fn to_store_error(e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Map SQLITE_BUSY to the retryable timeout variant; everything else is
/// reported as the backend being unavailable.
fn classify(e: rusqlite::Error, timeout: Duration) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::DatabaseBusy
                || inner.code == rusqlite::ErrorCode::DatabaseLocked =>
        {
            StoreError::Timeout { after: timeout }
        }
        _ => to_store_error(e),
    }
}

impl ResourceStore for SqliteStore {
    fn put(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        id: Uuid,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<(), StoreError> {
        self.with_conn(timeout, |conn| {
            conn.execute(
                "INSERT INTO resources (subject_id, kind, id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(subject_id, kind, id) DO UPDATE SET body = excluded.body",
                params![
                    subject_id.to_string(),
                    kind.as_str(),
                    id.to_string(),
                    bytes,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    fn get(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        id: Uuid,
        timeout: Duration,
    ) -> Result<Vec<u8>, StoreError> {
        let row = self.with_conn(timeout, |conn| {
            conn.query_row(
                "SELECT body FROM resources WHERE subject_id = ?1 AND kind = ?2 AND id = ?3",
                params![subject_id.to_string(), kind.as_str(), id.to_string()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })
        })?;

        row.ok_or(StoreError::NotFound { kind, id })
    }

    fn list(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        timeout: Duration,
    ) -> Result<Vec<Uuid>, StoreError> {
        let ids = self.with_conn(timeout, |conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM resources WHERE subject_id = ?1 AND kind = ?2 ORDER BY seq",
            )?;
            let rows = stmt.query_map(params![subject_id.to_string(), kind.as_str()], |row| {
                row.get::<_, String>(0)
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })?;

        ids.iter()
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|e| StoreError::Unavailable(format!("corrupt resource id: {e}")))
            })
            .collect()
    }
}
