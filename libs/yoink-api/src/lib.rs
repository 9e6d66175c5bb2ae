pub mod error;
pub mod storage;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::{ErrorKind, StorageError};
pub use storage::{validate_content, YoinkStorage};

// ════════════════════════════════════════════════════════════════
//  Content
// ════════════════════════════════════════════════════════════════

/// A single typed reading. Serialized as a bare JSON number or string.
///
/// Variant order matters for deserialization: integral JSON numbers that
/// fit in `i64` become `Integer`, every other number becomes `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for ContentValue {
    fn from(v: i64) -> Self {
        ContentValue::Integer(v)
    }
}

impl From<f64> for ContentValue {
    fn from(v: f64) -> Self {
        ContentValue::Float(v)
    }
}

impl From<&str> for ContentValue {
    fn from(v: &str) -> Self {
        ContentValue::Text(v.to_string())
    }
}

/// Parameter name → typed value. Sorted so the stored document is stable.
pub type Content = BTreeMap<String, ContentValue>;

// ════════════════════════════════════════════════════════════════
//  Records
// ════════════════════════════════════════════════════════════════

/// One persisted publish event, with its content decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yoink {
    pub id: i64,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub content: Content,
}

/// A row as the gateway returns it: content still in its serialized form.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredYoink {
    pub id: i64,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

// ════════════════════════════════════════════════════════════════
//  Query
// ════════════════════════════════════════════════════════════════

/// Ordering over `(timestamp, id)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    /// Newest first; the default for every read path.
    #[default]
    Desc,
}

/// Parameters of a gateway query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YoinkQuery {
    pub topic: String,
    pub order: SortOrder,
    /// `None` = unbounded.
    pub limit: Option<usize>,
}

impl YoinkQuery {
    /// Newest-first query over `topic`.
    pub fn newest(topic: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            topic: topic.into(),
            order: SortOrder::Desc,
            limit,
        }
    }
}
