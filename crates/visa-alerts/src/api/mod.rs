//! REST API implementation
//!
//! This module provides the HTTP API over the alert service.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::alerting::AlertService;
use crate::config::Config;
use crate::error::Result;

/// Build a CORS layer admitting only `origins`.
///
/// Requests without an `Origin` header are not cross-origin and pass
/// through untouched.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// The full application: routes, CORS and request logging
pub fn build_app(service: AlertService, config: &Config) -> Router {
    let state = AppState {
        service,
        expose_errors: config.expose_errors(),
    };

    create_router(state)
        .layer(cors_layer(&config.cors.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// HTTP API server
pub struct HttpServer {
    app: Router,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(service: AlertService, config: &Config) -> Self {
        Self {
            app: build_app(service, config),
        }
    }

    /// Start the HTTP server, stopping on Ctrl+C
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;

        info!("HTTP server listening on {}", addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Ctrl+C received, shutting down...");
                }
            })
            .await?;

        Ok(())
    }
}
