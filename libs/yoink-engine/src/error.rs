use yoink_api::StorageError;

/// Who is at fault for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller-correctable input.
    BadRequest,
    /// Storage or encoding failure on our side.
    Internal,
}

/// Which gateway call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Append,
    Query,
}

#[derive(Debug, thiserror::Error)]
pub enum YoinkError {
    #[error("topic is empty")]
    MissingTopic,

    #[error("parameter '{key}' has more than 1 value")]
    MultiValuedParameter { key: String },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("number {0} is less than 1")]
    NumberOutOfRange(i64),

    #[error("malformed content: {0}")]
    MalformedContent(String),

    #[error("invalid content: {0}")]
    InvalidContent(StorageError),

    #[error("content decode failure on yoink {id}: {detail}")]
    ContentDecode { id: i64, detail: String },

    #[error("{source}")]
    Storage { op: StorageOp, source: StorageError },
}

impl YoinkError {
    /// Map a gateway error: a rejected document is the caller's fault,
    /// everything else is ours.
    pub(crate) fn from_storage(op: StorageOp, e: StorageError) -> Self {
        if op == StorageOp::Append && e.is_rejected_content() {
            YoinkError::InvalidContent(e)
        } else {
            YoinkError::Storage { op, source: e }
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            YoinkError::MissingTopic
            | YoinkError::MultiValuedParameter { .. }
            | YoinkError::InvalidNumber(_)
            | YoinkError::NumberOutOfRange(_)
            | YoinkError::InvalidContent(_) => ErrorClass::BadRequest,
            YoinkError::MalformedContent(_)
            | YoinkError::ContentDecode { .. }
            | YoinkError::Storage { .. } => ErrorClass::Internal,
        }
    }

    /// Short human label shown next to the cause.
    pub fn label(&self) -> &'static str {
        match self {
            YoinkError::MissingTopic => "Error validating topic name",
            YoinkError::MultiValuedParameter { .. } => "Bad Request",
            YoinkError::InvalidNumber(_) => "Error parsing number of yoinks",
            YoinkError::NumberOutOfRange(_) => "Error validating number of yoinks",
            YoinkError::MalformedContent(_) => "Error encoding content to JSON",
            YoinkError::InvalidContent(_) => "Invalid JSON",
            YoinkError::ContentDecode { .. } => "Error decoding content from JSON",
            YoinkError::Storage { op: StorageOp::Append, .. } => "Error inserting data to database",
            YoinkError::Storage { op: StorageOp::Query, .. } => "Error getting data from database",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_documents_are_client_errors() {
        let err = YoinkError::from_storage(StorageOp::Append, StorageError::rejected_content("bad"));
        assert!(matches!(err, YoinkError::InvalidContent(_)));
        assert_eq!(err.class(), ErrorClass::BadRequest);
    }

    #[test]
    fn io_failures_are_internal_and_keep_the_message() {
        let err = YoinkError::from_storage(StorageOp::Append, StorageError::backend("disk I/O error"));
        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(err.to_string(), "disk I/O error");
        assert_eq!(err.label(), "Error inserting data to database");

        let err = YoinkError::from_storage(StorageOp::Query, StorageError::rejected_content("odd"));
        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(err.label(), "Error getting data from database");
    }
}
