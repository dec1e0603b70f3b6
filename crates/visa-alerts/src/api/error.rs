//! Mapping of crate errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::Error;

/// Message returned for server errors outside development mode
pub const GENERIC_MESSAGE: &str = "Something went wrong";

/// An error on its way out of a handler
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    expose: bool,
}

impl ApiError {
    /// Wrap `error`; `expose` echoes internal messages to the caller
    pub fn new(error: Error, expose: bool) -> Self {
        Self { error, expose }
    }

    /// The wrapped error
    pub fn error(&self) -> &Error {
        &self.error
    }
}

#[derive(Serialize)]
struct ValidationBody<'a> {
    error: &'a str,
    details: &'a [String],
}

#[derive(Serialize)]
struct NotFoundBody {
    error: String,
}

#[derive(Serialize)]
struct ServerErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.error {
            Error::Validation { label, details } => (
                StatusCode::BAD_REQUEST,
                Json(ValidationBody {
                    error: label,
                    details,
                }),
            )
                .into_response(),
            Error::NotFound { entity, .. } => (
                StatusCode::NOT_FOUND,
                Json(NotFoundBody {
                    error: format!("{entity} not found"),
                }),
            )
                .into_response(),
            other => {
                error!(error = %other, "request failed");
                let message = if self.expose {
                    other.to_string()
                } else {
                    GENERIC_MESSAGE.to_string()
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ServerErrorBody {
                        error: "ServerError",
                        message,
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_details() {
        let err = Error::validation("Validation failed", vec!["\"city\" is required".into()]);
        let (status, body) = render(ApiError::new(err, false)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Validation failed", "details": ["\"city\" is required"] })
        );
    }

    #[tokio::test]
    async fn not_found_is_short() {
        let (status, body) = render(ApiError::new(Error::not_found("Alert", "x"), true)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Alert not found" }));
    }

    #[tokio::test]
    async fn server_errors_hide_details_outside_development() {
        let (status, body) = render(ApiError::new(Error::internal("pool exhausted"), false)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], GENERIC_MESSAGE);

        let (_, body) = render(ApiError::new(Error::internal("pool exhausted"), true)).await;
        assert_eq!(body["message"], "Internal error: pool exhausted");
        assert_eq!(body["error"], "ServerError");
    }
}
