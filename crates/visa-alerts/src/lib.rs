//! # visa-alerts
//!
//! Visa appointment slot alert tracker.
//!
//! Alerts record a country, city and visa type someone wants a slot for,
//! plus a status (`Active`, `Booked`, `Expired`).
//!
//! ## Architecture
//!
//! - **Store**: PostgreSQL via sqlx, or an in-memory store for development
//! - **Service**: validation followed by a single store operation
//! - **API**: REST endpoints under `/api/alerts`
//! - **Client**: typed HTTP client and list-view state
//!
//! ## Quick Start
//!
//! ```bash
//! # Serve against an in-memory store
//! visa-alerts dev
//!
//! # Create and list alerts
//! visa-alerts alerts create --country Japan --city Tokyo --visa-type Tourist
//! visa-alerts alerts list --country jap
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alerting;
pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{AlertService, ListQuery, PageLimits};
    pub use crate::client::{AlertBrowser, AlertClient, ClientError};
    pub use crate::config::Config;
    pub use crate::db::{AlertStore, MemoryAlertStore, PostgresAlertStore};
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
}
