//! List-query parsing and the pagination envelope shared by every
//! listing endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: u64 = 12;

/// Pagination metadata returned alongside every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub next_page: Option<u64>,
    pub previous_page: Option<u64>,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(limit.max(1));
        let has_next_page = page < total_pages;
        let has_previous_page = page > 1;

        Self {
            page,
            total_items,
            total_pages,
            has_next_page,
            has_previous_page,
            next_page: has_next_page.then(|| page + 1),
            previous_page: has_previous_page.then(|| page - 1),
        }
    }
}

/// Common listing query parameters: `?page=&limit=&search=`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Requested page, clamped to >= 1.
    pub fn page(&self) -> u64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.limit()
    }

    /// Search term, trimmed; empty strings count as absent.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Deserializes an optional comma-separated query value into a vector,
/// e.g. `?categoriesIds=a,b,c`.
pub fn comma_separated<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw {
        None => Ok(None),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<T>().map_err(serde::de::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(|values| if values.is_empty() { None } else { Some(values) }),
    }
}
