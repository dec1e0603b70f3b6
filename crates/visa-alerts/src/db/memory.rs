//! In-process alert store for development mode and tests

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::AlertStore;
use crate::error::Result;
use crate::models::{Alert, AlertFilter, AlertStatus, NewAlert, PageRequest};

/// Alert store held entirely in memory.
///
/// Alerts are kept in insertion order; listings walk them newest first, so
/// alerts sharing a timestamp still come back in a stable order.
#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: RwLock<Vec<Alert>>,
}

impl MemoryAlertStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored alerts
    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    /// Whether the store holds no alerts
    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn insert(&self, alert: NewAlert) -> Result<Alert> {
        let alert = alert.into_alert(Utc::now());
        self.alerts.write().push(alert.clone());
        Ok(alert)
    }

    async fn find(&self, filter: &AlertFilter, page: PageRequest) -> Result<Vec<Alert>> {
        let alerts = self.alerts.read();
        let mut matching: Vec<&Alert> = alerts.iter().rev().filter(|a| filter.matches(a)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(skip)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &AlertFilter) -> Result<u64> {
        let alerts = self.alerts.read();
        Ok(alerts.iter().filter(|a| filter.matches(a)).count() as u64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Alert>> {
        Ok(self.alerts.read().iter().find(|a| a.id == id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: AlertStatus) -> Result<Option<Alert>> {
        let mut alerts = self.alerts.write();
        Ok(alerts.iter_mut().find(|a| a.id == id).map(|alert| {
            alert.status = status;
            alert.updated_at = Utc::now();
            alert.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut alerts = self.alerts.write();
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        Ok(alerts.len() < before)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisaType;

    fn new_alert(country: &str) -> NewAlert {
        NewAlert {
            country: country.to_string(),
            city: "Capital".to_string(),
            visa_type: VisaType::Business,
        }
    }

    #[tokio::test]
    async fn find_returns_newest_first() {
        let store = MemoryAlertStore::new();
        for country in ["Spain", "Italy", "Peru"] {
            store.insert(new_alert(country)).await.unwrap();
        }
        assert_eq!(store.len(), 3);

        let page = store
            .find(&AlertFilter::default(), PageRequest { page: 1, limit: 10 })
            .await
            .unwrap();
        let countries: Vec<_> = page.iter().map(|a| a.country.as_str()).collect();
        assert_eq!(countries, ["Peru", "Italy", "Spain"]);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let store = MemoryAlertStore::new();
        let created = store.insert(new_alert("Chile")).await.unwrap();

        let updated = store
            .update_status(created.id, AlertStatus::Expired)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, AlertStatus::Expired);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.country, created.country);
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let store = MemoryAlertStore::new();
        let created = store.insert(new_alert("Kenya")).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
