//! Publish history records and page arithmetic for the history listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZarazError};

/// Page size used when the caller leaves `per_page` unset.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// One published configuration version. Created by the service on publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: String,
}

/// The `result` of a history listing: total count plus one page of entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    pub count: u64,
    #[serde(default)]
    pub data: Vec<HistoryEntry>,
}

/// Requested page. Unset fields fall back to page 1 and `DEFAULT_PER_PAGE`;
/// explicit zeros are rejected rather than clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl HistoryParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Resolves defaults and validates, yielding `(page, per_page)`.
    pub fn resolve(&self) -> Result<(u32, u32)> {
        let page = self.page.unwrap_or(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page == 0 {
            return Err(ZarazError::InvalidPagination(
                "page must be at least 1".to_string(),
            ));
        }
        if per_page == 0 {
            return Err(ZarazError::InvalidPagination(
                "perPage must be at least 1".to_string(),
            ));
        }
        Ok((page, per_page))
    }

    pub fn query_pairs(&self) -> Result<Vec<(String, String)>> {
        let (page, per_page) = self.resolve()?;
        Ok(vec![
            ("page".to_string(), page.to_string()),
            ("perPage".to_string(), per_page.to_string()),
        ])
    }
}

/// Where a history page sits in the full listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub count: u64,
    pub has_more: bool,
}

impl PageInfo {
    pub fn new(page: u32, per_page: u32, count: u64) -> Self {
        let seen = u64::from(page) * u64::from(per_page);
        Self {
            page,
            per_page,
            count,
            has_more: seen < count,
        }
    }

    /// Parameters for the following page, if there is one.
    pub fn next(&self) -> Option<HistoryParams> {
        if !self.has_more {
            return None;
        }
        let page = self.page.checked_add(1)?;
        Some(HistoryParams::new(page, self.per_page))
    }
}
