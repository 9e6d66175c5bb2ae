use chrono::{DateTime, NaiveDateTime, Utc};

use yoink_api::{SortOrder, StorageError};

/// Idempotent schema. Compatible with databases created by earlier
/// releases: same table, same columns, the index is additive.
pub(crate) const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS yoinks (
        id INTEGER NOT NULL,
        topic TEXT NOT NULL,
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
        content TEXT NOT NULL,
        PRIMARY KEY (id AUTOINCREMENT)
    );
    CREATE INDEX IF NOT EXISTS idx_yoinks_topic_timestamp ON yoinks(topic, timestamp, id);
";

pub(crate) const INSERT_RETURNING: &str =
    "INSERT INTO yoinks (topic, content) VALUES (?1, ?2) RETURNING id, topic, timestamp, content";

/// `LIMIT -1` is unbounded in SQLite.
pub(crate) fn select_by_topic(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Desc => {
            "SELECT id, topic, timestamp, content FROM yoinks WHERE topic = ?1 \
             ORDER BY timestamp DESC, id DESC LIMIT ?2"
        }
        SortOrder::Asc => {
            "SELECT id, topic, timestamp, content FROM yoinks WHERE topic = ?1 \
             ORDER BY timestamp ASC, id ASC LIMIT ?2"
        }
    }
}

pub(crate) fn sql_limit(limit: Option<usize>) -> i64 {
    match limit {
        Some(n) => i64::try_from(n).unwrap_or(i64::MAX),
        None => -1,
    }
}

/// Parse a stored timestamp. `CURRENT_TIMESTAMP` yields `YYYY-MM-DD HH:MM:SS`
/// in UTC; RFC 3339 and fractional seconds are accepted as well.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StorageError::backend(format!("unreadable timestamp '{raw}'")))
}
