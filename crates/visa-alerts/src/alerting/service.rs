//! Alert service: validate, perform one store operation, return the result

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::validation::{self, ListQuery, PageLimits};
use crate::db::SharedStore;
use crate::error::{Error, Result};
use crate::models::{Alert, AlertPage, Pagination};

const ENTITY: &str = "Alert";

/// The four alert operations exposed over HTTP
#[derive(Clone)]
pub struct AlertService {
    store: SharedStore,
    limits: PageLimits,
}

impl AlertService {
    /// Create a service over `store`
    pub fn new(store: SharedStore, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    /// The backing store
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// List alerts matching the query, newest first, one page at a time.
    ///
    /// `total` counts every match, not just the returned page.
    pub async fn list(&self, query: &ListQuery) -> Result<AlertPage> {
        let (filter, page) = validation::validate_list_query(query, self.limits)?;

        let data = self.store.find(&filter, page).await?;
        let total = self.store.count(&filter).await?;
        debug!(?filter, page = page.page, limit = page.limit, total, "listed alerts");

        Ok(AlertPage {
            data,
            pagination: Pagination::new(total, page),
        })
    }

    /// Validate and persist a new alert
    pub async fn create(&self, body: &Value) -> Result<Alert> {
        let new_alert = validation::validate_create(body)?;
        let alert = self.store.insert(new_alert).await?;

        info!(id = %alert.id, country = %alert.country, city = %alert.city, "created alert");
        Ok(alert)
    }

    /// Replace the status of an existing alert.
    ///
    /// A missing target is reported as not found even when the payload is
    /// also invalid; nothing is written unless the payload validates.
    pub async fn update_status(&self, id: &str, body: &Value) -> Result<Alert> {
        let id = parse_id(id)?;

        let status = match validation::validate_status_update(body) {
            Ok(status) => status,
            Err(err) => {
                if self.store.get(id).await?.is_none() {
                    return Err(Error::not_found(ENTITY, id.to_string()));
                }
                return Err(err);
            }
        };

        let alert = self
            .store
            .update_status(id, status)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY, id.to_string()))?;

        info!(id = %alert.id, status = %alert.status, "updated alert status");
        Ok(alert)
    }

    /// Fail with not found unless `id` names a stored alert
    pub async fn ensure_exists(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        match self.store.get(id).await? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(ENTITY, id.to_string())),
        }
    }

    /// Permanently remove an alert
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;

        if !self.store.delete(id).await? {
            return Err(Error::not_found(ENTITY, id.to_string()));
        }

        info!(id = %id, "deleted alert");
        Ok(())
    }
}

/// Identifiers that cannot name a stored alert are simply not found
fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::not_found(ENTITY, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use proptest::prelude::*;
    use serde_json::json;

    use crate::db::MemoryAlertStore;
    use crate::models::AlertStatus;

    fn service() -> AlertService {
        AlertService::new(Arc::new(MemoryAlertStore::new()), PageLimits::default())
    }

    fn payload(country: &str) -> Value {
        json!({ "country": country, "city": "Capital", "visaType": "Tourist" })
    }

    fn query(country: Option<&str>, page: u32, limit: u32) -> ListQuery {
        ListQuery {
            country: country.map(str::to_string),
            status: None,
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
        }
    }

    #[tokio::test]
    async fn created_alerts_start_active_with_unique_ids() {
        let service = service();
        let mut ids = HashSet::new();

        for _ in 0..20 {
            let alert = service.create(&payload("France")).await.unwrap();
            assert_eq!(alert.status, AlertStatus::Active);
            assert!(ids.insert(alert.id));
        }
    }

    #[tokio::test]
    async fn invalid_create_touches_nothing() {
        let service = service();
        let err = service.create(&json!({ "country": "France" })).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(service.store().count(&Default::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn country_filter_is_case_insensitive_substring() {
        let service = service();
        service.create(&payload("France")).await.unwrap();
        service.create(&payload("Germany")).await.unwrap();

        let page = service.list(&query(Some("fra"), 1, 10)).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].country, "France");
        assert_eq!(page.pagination.total, 1);

        let page = service.list(&query(Some("zz"), 1, 10)).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.pages, 1);
    }

    #[tokio::test]
    async fn status_filter_narrows_results() {
        let service = service();
        let booked = service.create(&payload("Japan")).await.unwrap();
        service.create(&payload("Japan")).await.unwrap();
        service
            .update_status(&booked.id.to_string(), &json!({ "status": "Booked" }))
            .await
            .unwrap();

        let page = service
            .list(&ListQuery {
                status: Some("Booked".into()),
                ..ListQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, booked.id);
    }

    #[tokio::test]
    async fn update_on_missing_id_is_not_found_even_with_bad_payload() {
        let service = service();
        let missing = Uuid::new_v4().to_string();

        let err = service
            .update_status(&missing, &json!({ "status": "Lost" }))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .update_status(&missing, &json!({ "status": "Booked" }))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_on_existing_id_with_bad_payload_is_validation() {
        let service = service();
        let alert = service.create(&payload("Peru")).await.unwrap();

        let err = service
            .update_status(&alert.id.to_string(), &json!({ "status": "Lost" }))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let stored = service.store().get(alert.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AlertStatus::Active);
    }

    #[tokio::test]
    async fn delete_then_act_is_not_found() {
        let service = service();
        let alert = service.create(&payload("Chile")).await.unwrap();
        let id = alert.id.to_string();

        service.delete(&id).await.unwrap();
        assert!(service.delete(&id).await.unwrap_err().is_not_found());
        assert!(service
            .update_status(&id, &json!({ "status": "Booked" }))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let service = service();
        assert!(service.delete("not-a-uuid").await.unwrap_err().is_not_found());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn page_window_matches_formula(n in 0usize..40, limit in 1u32..15, page in 1u32..8) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = rt.block_on(async {
                let service = service();
                for _ in 0..n {
                    service.create(&payload("Norway")).await.unwrap();
                }
                service.list(&query(None, page, limit)).await.unwrap()
            });

            let n = n as u64;
            let l = u64::from(limit);
            let expected = l.min(n.saturating_sub(l * u64::from(page - 1)));
            prop_assert_eq!(result.data.len() as u64, expected);
            prop_assert_eq!(result.pagination.total, n);
            prop_assert_eq!(result.pagination.pages, n.div_ceil(l).max(1));
        }
    }
}
