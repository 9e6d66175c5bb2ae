use yoink_api::{Content, StoredYoink, Yoink};

use crate::error::YoinkError;

/// Rebuild typed content from a stored row. A row that does not decode is
/// store corruption, never a caller mistake.
pub(crate) fn decode(stored: StoredYoink) -> Result<Yoink, YoinkError> {
    let content: Content =
        serde_json::from_str(&stored.content).map_err(|e| YoinkError::ContentDecode {
            id: stored.id,
            detail: e.to_string(),
        })?;
    Ok(Yoink {
        id: stored.id,
        topic: stored.topic,
        timestamp: stored.timestamp,
        content,
    })
}

pub(crate) fn ensure_topic(topic: &str) -> Result<(), YoinkError> {
    if topic.is_empty() {
        return Err(YoinkError::MissingTopic);
    }
    Ok(())
}
