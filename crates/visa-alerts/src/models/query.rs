//! Query and response types shared between API and store layers

use serde::{Deserialize, Serialize};

use super::{Alert, AlertStatus};

/// Filter applied to alert listings.
///
/// Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    /// Case-insensitive substring of the country name
    pub country: Option<String>,
    /// Exact status
    pub status: Option<AlertStatus>,
}

impl AlertFilter {
    /// Whether `alert` satisfies this filter
    pub fn matches(&self, alert: &Alert) -> bool {
        let country_ok = self.country.as_deref().map_or(true, |needle| {
            alert
                .country
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let status_ok = self.status.map_or(true, |s| alert.status == s);

        country_ok && status_ok
    }
}

/// Requested pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Records per page
    pub limit: u32,
}

impl PageRequest {
    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Pagination metadata returned with a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Matching records across all pages
    pub total: u64,
    /// Page returned
    pub page: u32,
    /// Page size used
    pub limit: u32,
    /// Page count, at least 1
    pub pages: u64,
}

impl Pagination {
    /// Build metadata for `total` matching records; `pages` is never below 1
    pub fn new(total: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            total,
            page: request.page,
            limit: request.limit,
            pages: total.div_ceil(limit).max(1),
        }
    }
}

/// One page of alerts plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPage {
    /// Alerts on this page, newest first
    pub data: Vec<Alert>,
    /// Window metadata
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 1)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 5, 5)]
    #[case(7, 1, 7)]
    fn pages_is_ceiling_floored_at_one(#[case] total: u64, #[case] limit: u32, #[case] pages: u64) {
        let meta = Pagination::new(total, PageRequest { page: 1, limit });
        assert_eq!(meta.pages, pages);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, limit: 10 }.offset(), 20);
    }
}
