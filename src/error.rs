use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected input on a create request: wrong image extension or a
    /// missing required form field.
    #[error("{0}")]
    BadRequest(String),

    /// Item id not present in the store.
    #[error("{0}")]
    NotFound(String),

    /// The multipart payload could not be read.
    #[error("Failed to read form data: {0}")]
    Multipart(#[from] MultipartError),

    /// Filesystem failure while saving or removing an uploaded image.
    #[error("Image storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Every failure in this API is the caller's 400 or 404; the error
    /// contract has no 5xx class.
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Multipart(_) | AppError::Io(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "Request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            AppError::NotFound("Item not found".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn bad_request_maps_to_400() {
        assert_eq!(
            AppError::BadRequest("Only image files are allowed!".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn io_failure_maps_to_400() {
        let err = AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn display_keeps_the_caller_facing_message() {
        let err = AppError::BadRequest("Missing required field: name".to_string());
        assert_eq!(err.to_string(), "Missing required field: name");
    }
}
