use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use tokio::sync::RwLock;

use yoink_api::{validate_content, SortOrder, StorageError, StoredYoink, YoinkQuery, YoinkStorage};

// ═══════════════════════════════════════════════════════════════
//  MemoryStorage
// ═══════════════════════════════════════════════════════════════

#[derive(Default)]
struct Log {
    rows: Vec<StoredYoink>,
    last_id: i64,
}

/// In-memory append log. Nothing survives a restart; meant for ephemeral
/// deployments and tests.
///
/// Rows are kept in insertion order, which is also `(timestamp, id)` order
/// because both are assigned under the same write lock.
#[derive(Default)]
pub struct MemoryStorage {
    log: RwLock<Log>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl YoinkStorage for MemoryStorage {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }

    fn append(
        &self,
        topic: &str,
        content: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StoredYoink, StorageError>> + Send + '_>> {
        let topic = topic.to_string();
        let content = content.to_string();
        Box::pin(async move {
            validate_content(&content)?;

            let mut log = self.log.write().await;
            log.last_id += 1;
            let row = StoredYoink {
                id: log.last_id,
                topic,
                timestamp: Utc::now(),
                content,
            };
            log.rows.push(row.clone());
            Ok::<_, StorageError>(row)
        })
    }

    fn query(
        &self,
        query: &YoinkQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredYoink>, StorageError>> + Send + '_>> {
        let query = query.clone();
        Box::pin(async move {
            let log = self.log.read().await;
            let matching = log.rows.iter().filter(|r| r.topic == query.topic);
            let limit = query.limit.unwrap_or(usize::MAX);

            let result: Vec<StoredYoink> = match query.order {
                SortOrder::Desc => matching.rev().take(limit).cloned().collect(),
                SortOrder::Asc => matching.take(limit).cloned().collect(),
            };
            Ok(result)
        })
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yoink_api::ErrorKind;

    #[tokio::test]
    async fn ids_increase_across_topics() {
        let storage = MemoryStorage::new();
        let a = storage.append("a", "{}").await.unwrap();
        let b = storage.append("b", "{}").await.unwrap();
        let c = storage.append("a", r#"{"x":1}"#).await.unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(c.content, r#"{"x":1}"#);
    }

    #[tokio::test]
    async fn query_orders_and_limits() {
        let storage = MemoryStorage::new();
        for i in 0..5 {
            storage.append("t", &format!(r#"{{"i":{i}}}"#)).await.unwrap();
        }
        storage.append("other", "{}").await.unwrap();

        let newest = storage.query(&YoinkQuery::newest("t", Some(3))).await.unwrap();
        let ids: Vec<i64> = newest.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);

        let oldest = storage
            .query(&YoinkQuery { topic: "t".into(), order: SortOrder::Asc, limit: Some(2) })
            .await
            .unwrap();
        let ids: Vec<i64> = oldest.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let all = storage.query(&YoinkQuery::newest("t", None)).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn invalid_content_is_not_appended() {
        let storage = MemoryStorage::new();
        let err = storage.append("t", "not json").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RejectedContent);
        assert!(storage.query(&YoinkQuery::newest("t", None)).await.unwrap().is_empty());
    }
}
