use std::collections::HashMap;

use serde::Serialize;

use super::error::QueryError;

/// Validated page window from `page` / `perPage` query parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Read `page` and `perPage`; missing values take defaults, `perPage`
    /// is capped at `max_per_page`.
    pub fn from_params(
        params: &HashMap<String, String>,
        default_per_page: u32,
        max_per_page: u32,
    ) -> Result<Self, QueryError> {
        let page = match params.get("page").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(raw) => parse_positive(raw).ok_or_else(|| QueryError::InvalidPage(raw.to_string()))?,
            None => 1,
        };
        let per_page = match params.get("perPage").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(raw) => parse_positive(raw).ok_or_else(|| QueryError::InvalidPerPage(raw.to_string()))?,
            None => default_per_page,
        };

        Ok(Self::new(page, per_page.min(max_per_page.max(1))))
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|n| *n > 0)
}

/// One page of results plus navigation totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u64,
    pub has_more: bool,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page);
        let last_page = total.div_ceil(per_page);
        Self {
            data,
            total,
            page: request.page,
            per_page: request.per_page,
            last_page,
            has_more: u64::from(request.page) < last_page,
        }
    }
}
