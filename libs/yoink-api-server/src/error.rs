use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use yoink_engine::{ErrorClass, YoinkError};

/// JSON error body: `{"error": cause, "detail": label, "status": code}`.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub detail: &'static str,
    pub status: u16,
}

/// Handler error: an engine failure or a path that did not extract.
#[derive(Debug)]
pub(crate) enum ApiError {
    Yoink(YoinkError),
    Path(PathRejection),
}

impl From<YoinkError> for ApiError {
    fn from(e: YoinkError) -> Self {
        ApiError::Yoink(e)
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::Path(e)
    }
}

impl ApiError {
    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Yoink(e) => {
                let status = match e.class() {
                    ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
                    ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                ErrorBody {
                    error: e.to_string(),
                    detail: e.label(),
                    status: status.as_u16(),
                }
            }
            ApiError::Path(rejection) => ErrorBody {
                error: rejection.body_text(),
                detail: "Error parsing request path",
                status: rejection.status().as_u16(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body();
        let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %body.error, "request failed");
        } else {
            tracing::debug!(error = %body.error, "rejected request");
        }
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yoink_api::StorageError;
    use yoink_engine::StorageOp;

    #[test]
    fn engine_errors_keep_their_class() {
        let body = ApiError::from(YoinkError::MissingTopic).body();
        assert_eq!(body.status, 400);
        assert_eq!(body.detail, "Error validating topic name");

        let storage = YoinkError::Storage {
            op: StorageOp::Query,
            source: StorageError::backend("disk I/O error"),
        };
        let body = ApiError::from(storage).body();
        assert_eq!(body.status, 500);
        assert_eq!(body.error, "disk I/O error");
    }
}
