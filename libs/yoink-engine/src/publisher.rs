use std::sync::Arc;

use yoink_api::{Yoink, YoinkStorage};

use crate::error::{StorageOp, YoinkError};
use crate::infer::{encode_content, infer_content};
use crate::params::RawParams;
use crate::record::{decode, ensure_topic};

/// Ingestion side: raw parameters in, persisted yoink out.
pub struct Publisher {
    storage: Arc<dyn YoinkStorage>,
}

impl Publisher {
    pub fn new(storage: Arc<dyn YoinkStorage>) -> Self {
        Self { storage }
    }

    /// Infer, encode and append one yoink to `topic`.
    ///
    /// Returns the row as the gateway persisted it, not the caller's input.
    /// Every error path leaves storage untouched.
    pub async fn publish(&self, topic: &str, params: &RawParams) -> Result<Yoink, YoinkError> {
        ensure_topic(topic)?;
        let content = infer_content(params)?;
        let document = encode_content(&content)?;

        let stored = self
            .storage
            .append(topic, &document)
            .await
            .map_err(|e| YoinkError::from_storage(StorageOp::Append, e))?;
        let yoink = decode(stored)?;

        tracing::debug!(topic = %yoink.topic, id = yoink.id, fields = yoink.content.len(), "published yoink");
        Ok(yoink)
    }
}
