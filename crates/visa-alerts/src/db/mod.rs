//! Alert store
//!
//! A thin repository over the persisted alert collection. The store trusts
//! its callers: values reaching it have already passed validation.

mod memory;
mod postgres;

pub use memory::MemoryAlertStore;
pub use postgres::{PostgresAlertStore, PostgresPool};

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{Alert, AlertFilter, AlertStatus, NewAlert, PageRequest};

/// Persistence operations over alerts.
///
/// Each call touches at most one record or is read-only, so no transactions
/// are involved. Concurrent writers to the same record are last-write-wins.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persist a new alert, assigning its id and timestamps
    async fn insert(&self, alert: NewAlert) -> Result<Alert>;

    /// Matching alerts, newest first, windowed by `page`
    async fn find(&self, filter: &AlertFilter, page: PageRequest) -> Result<Vec<Alert>>;

    /// Number of alerts matching `filter`, ignoring pagination
    async fn count(&self, filter: &AlertFilter) -> Result<u64>;

    /// Fetch a single alert
    async fn get(&self, id: Uuid) -> Result<Option<Alert>>;

    /// Replace the status and refresh `updated_at`; `None` if absent
    async fn update_status(&self, id: Uuid, status: AlertStatus) -> Result<Option<Alert>>;

    /// Remove an alert; `false` if it did not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Check the backing store is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Shared handle to whichever store backs the service
pub type SharedStore = Arc<dyn AlertStore>;

/// Connect to PostgreSQL, optionally applying migrations first
pub async fn connect(config: &DatabaseConfig, migrate: bool) -> Result<SharedStore> {
    let pool = PostgresPool::new(config).await?;
    if migrate {
        pool.migrate().await?;
    }
    pool.health_check().await?;
    Ok(Arc::new(PostgresAlertStore::new(&pool)))
}
