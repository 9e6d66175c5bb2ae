/// What went wrong inside a gateway. The engine only cares whether the
/// document was refused; everything else is reported as a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured store location cannot hold a database.
    Location,
    /// Driver, disk or lock failure while reading or writing.
    Backend,
    /// The content document is not a JSON object. Nothing was written.
    RejectedContent,
    /// `close` already ran.
    Closed,
}

/// Error returned by every `YoinkStorage` call.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct StorageError {
    kind: ErrorKind,
    message: String,
}

impl StorageError {
    fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn location(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Location, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Backend, message)
    }

    pub fn rejected_content(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::RejectedContent, message)
    }

    pub fn closed() -> Self {
        Self::with_kind(ErrorKind::Closed, "storage is closed")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when the caller's document, not the store, is at fault.
    pub fn is_rejected_content(&self) -> bool {
        self.kind == ErrorKind::RejectedContent
    }

    /// Name the gateway call that failed, e.g. `append: disk I/O error`.
    pub fn during(self, op: &str) -> Self {
        Self {
            message: format!("{op}: {}", self.message),
            ..self
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::rejected_content(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn during_names_the_call_and_keeps_kind() {
        let err = StorageError::backend("disk full").during("append");
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(err.to_string(), "append: disk full");
    }

    #[test]
    fn unparsable_documents_are_rejected_content() {
        let err: StorageError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_rejected_content());
    }

    #[test]
    fn closed_has_a_fixed_message() {
        let err = StorageError::closed();
        assert_eq!(err.kind(), ErrorKind::Closed);
        assert!(!err.is_rejected_content());
        assert_eq!(err.message(), "storage is closed");
    }
}
