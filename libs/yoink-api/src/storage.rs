use std::future::Future;
use std::pin::Pin;

use crate::{StorageError, StoredYoink, YoinkQuery};

// ════════════════════════════════════════════════════════════════
//  Storage Gateway
// ════════════════════════════════════════════════════════════════

/// Append-only, per-topic yoink store. One instance is opened at process
/// start and shared by every request.
///
/// Implementations: SQLite (durable), memory (ephemeral).
///
/// Guarantees every implementation must keep:
/// - rows appended are visible to any query issued after `append` returns;
/// - ids are assigned by the store, strictly increasing and never reused;
/// - `init` is idempotent and safe to call on every start.
pub trait YoinkStorage: Send + Sync {
    /// Create tables/indexes if missing.
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;

    /// Append one content document to `topic`. Assigns id and timestamp and
    /// returns the row exactly as persisted.
    ///
    /// `content` must be a serialized JSON object; anything else is rejected
    /// with `ErrorKind::RejectedContent` and nothing is written.
    fn append(
        &self,
        topic: &str,
        content: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StoredYoink, StorageError>> + Send + '_>>;

    /// Rows of `query.topic`, ordered by `(timestamp, id)` in `query.order`,
    /// truncated to `query.limit`.
    fn query(
        &self,
        query: &YoinkQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredYoink>, StorageError>> + Send + '_>>;

    /// Release the underlying handle. Called once on shutdown.
    fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;
}

/// Check that a content document is a JSON object. Shared by gateways so
/// that no backend ever persists an invalid document.
pub fn validate_content(content: &str) -> Result<(), StorageError> {
    match serde_json::from_str::<serde_json::Value>(content)? {
        serde_json::Value::Object(_) => Ok(()),
        other => Err(StorageError::rejected_content(format!(
            "content must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
