//! Alert API client
//!
//! A typed HTTP client plus the list-view state that drives it.

mod browser;
mod http;

pub use browser::{AlertBrowser, BrowserFilter, Debouncer};
pub use http::{AlertClient, ClientError, HealthStatus, ListParams};
