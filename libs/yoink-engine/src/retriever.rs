use std::num::NonZeroUsize;
use std::sync::Arc;

use yoink_api::{Yoink, YoinkQuery, YoinkStorage};

use crate::error::{StorageOp, YoinkError};
use crate::record::{decode, ensure_topic};

/// Parse the requested number of yoinks. No upper bound: asking for more
/// than exist just returns everything.
pub fn parse_count(raw: &str) -> Result<NonZeroUsize, YoinkError> {
    let n: i64 = raw
        .parse()
        .map_err(|e: std::num::ParseIntError| YoinkError::InvalidNumber(format!("'{raw}': {e}")))?;
    if n < 1 {
        return Err(YoinkError::NumberOutOfRange(n));
    }
    let n = usize::try_from(n).unwrap_or(usize::MAX);
    NonZeroUsize::new(n).ok_or(YoinkError::NumberOutOfRange(0))
}

/// Read side: newest-first lookups over a topic's history.
pub struct Retriever {
    storage: Arc<dyn YoinkStorage>,
}

impl Retriever {
    pub fn new(storage: Arc<dyn YoinkStorage>) -> Self {
        Self { storage }
    }

    /// Most recent yoink of `topic`; `None` when the topic has none.
    pub async fn latest(&self, topic: &str) -> Result<Option<Yoink>, YoinkError> {
        Ok(self.fetch(topic, Some(1)).await?.into_iter().next())
    }

    /// Up to `n` most recent yoinks, newest first.
    pub async fn last_n(&self, topic: &str, n: NonZeroUsize) -> Result<Vec<Yoink>, YoinkError> {
        self.fetch(topic, Some(n.get())).await
    }

    /// Whole history of `topic`, newest first.
    pub async fn all(&self, topic: &str) -> Result<Vec<Yoink>, YoinkError> {
        self.fetch(topic, None).await
    }

    async fn fetch(&self, topic: &str, limit: Option<usize>) -> Result<Vec<Yoink>, YoinkError> {
        ensure_topic(topic)?;
        let rows = self
            .storage
            .query(&YoinkQuery::newest(topic, limit))
            .await
            .map_err(|e| YoinkError::from_storage(StorageOp::Query, e))?;

        // One bad row fails the whole read.
        let yoinks = rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(topic, limit = ?limit, returned = yoinks.len(), "retrieved yoinks");
        Ok(yoinks)
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use super::*;
    use crate::{Publisher, RawParams};
    use storage_memory::MemoryStorage;
    use yoink_api::{ContentValue, StorageError, StoredYoink};

    fn engine() -> (Publisher, Retriever) {
        let storage: Arc<dyn YoinkStorage> = Arc::new(MemoryStorage::new());
        (Publisher::new(storage.clone()), Retriever::new(storage))
    }

    async fn publish_n(publisher: &Publisher, topic: &str, n: usize) -> Vec<Yoink> {
        let mut out = Vec::new();
        for i in 0..n {
            let params: RawParams = [("i", i.to_string())].into_iter().collect();
            out.push(publisher.publish(topic, &params).await.unwrap());
        }
        out
    }

    #[test]
    fn count_parsing() {
        assert_eq!(parse_count("3").unwrap().get(), 3);
        assert_eq!(parse_count("+4").unwrap().get(), 4);
        assert!(matches!(parse_count("abc"), Err(YoinkError::InvalidNumber(_))));
        assert!(matches!(parse_count("1.5"), Err(YoinkError::InvalidNumber(_))));
        assert!(matches!(parse_count(""), Err(YoinkError::InvalidNumber(_))));
        assert!(matches!(parse_count("0"), Err(YoinkError::NumberOutOfRange(0))));
        assert!(matches!(parse_count("-2"), Err(YoinkError::NumberOutOfRange(-2))));
    }

    #[tokio::test]
    async fn latest_matches_last_published() {
        let (publisher, retriever) = engine();
        let published = publish_n(&publisher, "t", 2).await;
        let latest = retriever.latest("t").await.unwrap().unwrap();
        assert_eq!(&latest, published.last().unwrap());
    }

    #[tokio::test]
    async fn last_n_is_bounded_and_newest_first() {
        let (publisher, retriever) = engine();
        let published = publish_n(&publisher, "t", 5).await;

        let three = retriever.last_n("t", parse_count("3").unwrap()).await.unwrap();
        let ids: Vec<i64> = three.iter().map(|y| y.id).collect();
        let expected: Vec<i64> = published.iter().rev().take(3).map(|y| y.id).collect();
        assert_eq!(ids, expected);

        let many = retriever.last_n("t", parse_count("100").unwrap()).await.unwrap();
        assert_eq!(many.len(), 5);
        assert_eq!(many[4].content["i"], ContentValue::Integer(0));
    }

    #[tokio::test]
    async fn unknown_topic_is_empty_not_an_error() {
        let (_, retriever) = engine();
        assert!(retriever.latest("ghost").await.unwrap().is_none());
        assert!(retriever.all("ghost").await.unwrap().is_empty());
        assert!(retriever.last_n("ghost", NonZeroUsize::MIN).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_topic_is_rejected() {
        let (_, retriever) = engine();
        assert!(matches!(retriever.all("").await, Err(YoinkError::MissingTopic)));
    }

    /// Returns one good and one corrupted row for any query.
    struct CorruptStorage;

    impl YoinkStorage for CorruptStorage {
        fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
            Box::pin(async { Ok(()) })
        }

        fn append(
            &self,
            _topic: &str,
            _content: &str,
        ) -> Pin<Box<dyn Future<Output = Result<StoredYoink, StorageError>> + Send + '_>> {
            Box::pin(async { Err(StorageError::backend("read-only")) })
        }

        fn query(
            &self,
            query: &YoinkQuery,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredYoink>, StorageError>> + Send + '_>> {
            let topic = query.topic.clone();
            let limit = query.limit;
            Box::pin(async move {
                let row = |id, content: &str| StoredYoink {
                    id,
                    topic: topic.clone(),
                    timestamp: "2022-10-26T11:21:11Z".parse().unwrap(),
                    content: content.to_string(),
                };
                let mut rows = vec![row(2, r#"{"a":1}"#), row(1, "{not json")];
                rows.truncate(limit.unwrap_or(usize::MAX));
                Ok(rows)
            })
        }

        fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn corrupted_row_fails_the_whole_read() {
        let retriever = Retriever::new(Arc::new(CorruptStorage));
        let err = retriever.all("t").await.unwrap_err();
        assert!(matches!(err, YoinkError::ContentDecode { id: 1, .. }));
        assert_eq!(err.class(), crate::ErrorClass::Internal);

        // The newest row alone is fine.
        assert!(retriever.latest("t").await.is_ok());
    }

    #[tokio::test]
    async fn storage_failure_is_internal() {
        let publisher = Publisher::new(Arc::new(CorruptStorage));
        let params: RawParams = [("a", "1")].into_iter().collect();
        let err = publisher.publish("t", &params).await.unwrap_err();
        assert_eq!(err.class(), crate::ErrorClass::Internal);
        assert_eq!(err.to_string(), "read-only");
    }
}
