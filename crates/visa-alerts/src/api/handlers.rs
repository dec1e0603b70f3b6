//! API handlers for the HTTP REST API

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use crate::alerting::validation::{CREATE_LABEL, LIST_QUERY_LABEL, STATUS_UPDATE_LABEL};
use crate::alerting::{AlertService, ListQuery};
use crate::error::Error;
use crate::models::{Alert, AlertPage};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Alert operations
    pub service: AlertService,
    /// Echo internal error messages in 500 responses
    pub expose_errors: bool,
}

impl AppState {
    fn reject(&self, error: Error) -> ApiError {
        ApiError::new(error, self.expose_errors)
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Server clock
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Route not found" })),
    )
}

/// List alerts with filtering and pagination
pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<AlertPage>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        state.reject(Error::validation(LIST_QUERY_LABEL, vec![rejection.body_text()]))
    })?;

    let page = state.service.list(&query).await.map_err(|e| state.reject(e))?;
    Ok(Json(page))
}

/// Create an alert
pub async fn create_alert(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Alert>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        state.reject(Error::validation(CREATE_LABEL, vec![rejection.body_text()]))
    })?;

    let alert = state.service.create(&body).await.map_err(|e| state.reject(e))?;
    Ok((StatusCode::CREATED, Json(alert)))
}

/// Update an alert's status
pub async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Alert>, ApiError> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            // An unreadable body on a missing alert is still a 404
            state.service.ensure_exists(&id).await.map_err(|e| state.reject(e))?;
            return Err(state.reject(Error::validation(
                STATUS_UPDATE_LABEL,
                vec![rejection.body_text()],
            )));
        }
    };

    let alert = state
        .service
        .update_status(&id, &body)
        .await
        .map_err(|e| state.reject(e))?;
    Ok(Json(alert))
}

/// Delete an alert
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(&id).await.map_err(|e| state.reject(e))?;
    Ok(StatusCode::NO_CONTENT)
}
