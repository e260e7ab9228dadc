//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use chatmote_domain::error::ChatmoteError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ChatmoteError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(ChatmoteError);

impl<E: Into<ChatmoteError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ChatmoteError::Validation(_)
            | ChatmoteError::Codec(_)
            | ChatmoteError::UnknownMessageKind(_) => StatusCode::BAD_REQUEST,
            // Rejections from the background context (cooldown, send in
            // flight, empty catalog) arrive as remote failures.
            ChatmoteError::Send(_) | ChatmoteError::Remote(_) => StatusCode::CONFLICT,
            ChatmoteError::Channel(_) | ChatmoteError::Bridge(_) => {
                tracing::warn!(error = %self.0, "context unreachable");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ChatmoteError::Script(_) | ChatmoteError::Page(_) => StatusCode::BAD_GATEWAY,
            ChatmoteError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "internal server error".to_string(),
                    }),
                )
                    .into_response();
            }
        };

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
