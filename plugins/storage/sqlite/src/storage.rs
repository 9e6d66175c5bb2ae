use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use yoink_api::{validate_content, StorageError, StoredYoink, YoinkQuery, YoinkStorage};

use crate::schema::{parse_timestamp, select_by_topic, sql_limit, CREATE_SCHEMA, INSERT_RETURNING};

// ════════════════════════════════════════════════════════════════
//  SqliteStorage
// ════════════════════════════════════════════════════════════════

/// Durable gateway over a single SQLite file.
///
/// One connection, opened once and shared; every call runs on the blocking
/// pool behind the mutex, so appends are serialized and ids never collide.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Option<Connection>>>,
    path: PathBuf,
}

type RawRow = (i64, String, String, String);

impl SqliteStorage {
    /// Open (creating if absent) the database at `path`. `:memory:` opens a
    /// private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory().map_err(sql_err)?
        } else {
            if let Ok(meta) = std::fs::metadata(&path) {
                if !meta.is_file() {
                    return Err(StorageError::location(format!(
                        "{} is not a regular file",
                        path.display()
                    )));
                }
            }
            Connection::open(&path).map_err(sql_err)?
        };
        conn.busy_timeout(std::time::Duration::from_secs(5)).map_err(sql_err)?;

        tracing::debug!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path,
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: &'static str, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::backend("connection lock poisoned"))?;
            let conn = guard
                .as_ref()
                .ok_or_else(StorageError::closed)?;
            f(conn)
        })
        .await
        .map_err(|e| StorageError::backend(format!("blocking task: {e}")))?
        .map_err(|e| e.during(op))
    }

    /// Drop the connection. Later calls fail with "storage is closed".
    async fn shutdown(&self) -> Result<(), StorageError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::backend("connection lock poisoned"))?;
            match guard.take() {
                Some(c) => c.close().map_err(|(_, e)| sql_err(e)),
                None => Ok(()),
            }
        })
        .await
        .map_err(|e| StorageError::backend(format!("blocking task: {e}")))??;

        tracing::debug!(path = %self.path.display(), "closed sqlite database");
        Ok(())
    }
}

impl YoinkStorage for SqliteStorage {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(self.with_conn("init", |conn| {
            conn.execute_batch(CREATE_SCHEMA).map_err(sql_err)
        }))
    }

    fn append(
        &self,
        topic: &str,
        content: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StoredYoink, StorageError>> + Send + '_>> {
        let topic = topic.to_string();
        let content = content.to_string();
        Box::pin(self.with_conn("append", move |conn| {
            validate_content(&content)?;
            let row: RawRow = conn
                .query_row(INSERT_RETURNING, params![topic, content], read_row)
                .map_err(sql_err)?;
            into_stored(row)
        }))
    }

    fn query(
        &self,
        query: &YoinkQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredYoink>, StorageError>> + Send + '_>> {
        let query = query.clone();
        Box::pin(self.with_conn("query", move |conn| {
            let mut stmt = conn.prepare_cached(select_by_topic(query.order)).map_err(sql_err)?;
            let rows = stmt
                .query_map(params![query.topic, sql_limit(query.limit)], read_row)
                .map_err(sql_err)?;

            let mut out = Vec::new();
            for row in rows {
                out.push(into_stored(row.map_err(sql_err)?)?);
            }
            Ok(out)
        }))
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(self.shutdown())
    }
}

// ════════════════════════════════════════════════════════════════
//  Helpers
// ════════════════════════════════════════════════════════════════

fn sql_err(e: rusqlite::Error) -> StorageError {
    StorageError::backend(e.to_string())
}

fn read_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
}

fn into_stored((id, topic, timestamp, content): RawRow) -> Result<StoredYoink, StorageError> {
    Ok(StoredYoink {
        id,
        topic,
        timestamp: parse_timestamp(&timestamp)?,
        content,
    })
}
