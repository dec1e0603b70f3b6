//! HTTP client for the alert API

use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::models::{Alert, AlertPage, AlertStatus, NewAlert};

/// Failures seen by API callers
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response at all: timeout, refused connection, DNS failure.
    /// Usually means the service is still waking up.
    #[error("Server not reachable: {0}")]
    Unreachable(String),

    /// The API rejected the input
    #[error("{error}: {}", details.join("; "))]
    Validation {
        /// Label from the response
        error: String,
        /// One message per violation
        details: Vec<String>,
    },

    /// The referenced alert does not exist
    #[error("{0}")]
    NotFound(String),

    /// Any other non-success response
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the response, or the status reason
        message: String,
    },

    /// The response body was not what the API promises
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The configured API URL is unusable
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Whether the service gave no response at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::Unreachable(err.to_string())
        } else {
            Self::Decode(err.to_string())
        }
    }
}

/// Error payload as rendered by the API
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Health endpoint payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthStatus {
    /// `"ok"` when healthy
    pub status: String,
    /// Server clock at the time of the check
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Query for one page of alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// Country substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Exact status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
    /// 1-based page
    pub page: u32,
    /// Page size
    pub limit: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            country: None,
            status: None,
            page: 1,
            limit: 10,
        }
    }
}

/// Client for the alert REST API
#[derive(Clone)]
pub struct AlertClient {
    http: reqwest::Client,
    base: Url,
}

impl AlertClient {
    /// Create a client for the API at `config.api_url`
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut base = Url::parse(&config.api_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    /// Probe the health endpoint
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.http.get(self.endpoint("api/health")?).send().await?;
        decode(response).await
    }

    /// Fetch one page of alerts
    pub async fn list(&self, params: &ListParams) -> Result<AlertPage, ClientError> {
        debug!(?params, "fetching alerts");
        let response = self
            .http
            .get(self.endpoint("api/alerts")?)
            .query(params)
            .send()
            .await?;
        decode(response).await
    }

    /// Create an alert
    pub async fn create(&self, alert: &NewAlert) -> Result<Alert, ClientError> {
        let response = self
            .http
            .post(self.endpoint("api/alerts")?)
            .json(alert)
            .send()
            .await?;
        decode(response).await
    }

    /// Change an alert's status
    pub async fn update_status(&self, id: Uuid, status: AlertStatus) -> Result<Alert, ClientError> {
        let response = self
            .http
            .put(self.endpoint(&format!("api/alerts/{id}"))?)
            .json(&json!({ "status": status }))
            .send()
            .await?;
        decode(response).await
    }

    /// Delete an alert
    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("api/alerts/{id}"))?)
            .send()
            .await?;
        check(response).await.map(drop)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    let error = body.error.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });

    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::Validation {
            error,
            details: body.details,
        },
        StatusCode::NOT_FOUND => ClientError::NotFound(error),
        _ => ClientError::Server {
            status: status.as_u16(),
            message: body.message.unwrap_or(error),
        },
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check(response).await?;
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
