//! Client-side alert list state
//!
//! Holds the current filter, page and fetched alerts. Every mutation is
//! followed by a fresh fetch of the current page; nothing is patched
//! locally.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use uuid::Uuid;

use super::http::{AlertClient, ClientError, ListParams};
use crate::models::{Alert, AlertStatus, Pagination};

/// Coalesces bursts of values, yielding only the last one once input has
/// been quiet for the configured delay
pub struct Debouncer<T> {
    rx: mpsc::Receiver<T>,
    delay: Duration,
}

impl<T> Debouncer<T> {
    /// Create a debouncer and the sender that feeds it
    pub fn channel(delay: Duration) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self { rx, delay })
    }

    /// Wait for the next settled value; `None` once all senders are gone
    pub async fn next(&mut self) -> Option<T> {
        let mut latest = self.rx.recv().await?;

        loop {
            tokio::select! {
                next = self.rx.recv() => match next {
                    Some(value) => latest = value,
                    None => return Some(latest),
                },
                () = sleep(self.delay) => return Some(latest),
            }
        }
    }
}

/// Filter currently applied to the list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserFilter {
    /// Country substring; empty means unfiltered
    pub country: String,
    /// Exact status; `None` means any
    pub status: Option<AlertStatus>,
}

/// The list view's state machine
pub struct AlertBrowser {
    client: AlertClient,
    filter: BrowserFilter,
    page: u32,
    limit: u32,
    alerts: Vec<Alert>,
    pagination: Option<Pagination>,
    loading: bool,
}

impl AlertBrowser {
    /// Start on page 1 with no filter
    pub fn new(client: AlertClient, limit: u32) -> Self {
        Self {
            client,
            filter: BrowserFilter::default(),
            page: 1,
            limit: limit.max(1),
            alerts: Vec::new(),
            pagination: None,
            loading: false,
        }
    }

    /// Alerts on the current page
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Metadata from the last successful fetch
    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Current page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Current filter
    pub fn filter(&self) -> &BrowserFilter {
        &self.filter
    }

    /// Whether a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn params(&self) -> ListParams {
        ListParams {
            country: Some(self.filter.country.clone()).filter(|c| !c.is_empty()),
            status: self.filter.status,
            page: self.page,
            limit: self.limit,
        }
    }

    /// Re-fetch the current page.
    ///
    /// On failure the previous page stays in place.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.client.list(&self.params()).await;
        self.loading = false;

        let page = result?;
        self.alerts = page.data;
        self.pagination = Some(page.pagination);
        Ok(())
    }

    /// Apply a (settled) country filter and go back to page 1
    pub async fn set_country_filter(&mut self, country: &str) -> Result<(), ClientError> {
        self.filter.country = country.trim().to_string();
        self.page = 1;
        self.refresh().await
    }

    /// Apply a status filter and go back to page 1
    pub async fn set_status_filter(&mut self, status: Option<AlertStatus>) -> Result<(), ClientError> {
        self.filter.status = status;
        self.page = 1;
        self.refresh().await
    }

    /// Apply the next settled value from a debounced country input.
    ///
    /// Returns `None` once the input is closed.
    pub async fn follow_country_input(
        &mut self,
        input: &mut Debouncer<String>,
    ) -> Option<Result<(), ClientError>> {
        let country = input.next().await?;
        Some(self.set_country_filter(&country).await)
    }

    /// Move to `page`; requests outside `1..=pages` are ignored.
    ///
    /// Returns whether the page changed.
    pub async fn go_to_page(&mut self, page: u32) -> Result<bool, ClientError> {
        let pages = self.pagination.map_or(1, |p| p.pages);
        if page < 1 || u64::from(page) > pages {
            return Ok(false);
        }

        self.page = page;
        self.refresh().await?;
        Ok(true)
    }

    /// Change an alert's status, then re-fetch the current page
    pub async fn change_status(&mut self, id: Uuid, status: AlertStatus) -> Result<Alert, ClientError> {
        let alert = self.client.update_status(id, status).await?;
        self.refresh().await?;
        Ok(alert)
    }

    /// Delete an alert, then re-fetch the current page
    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.client.delete(id).await?;
        self.refresh().await
    }
}
