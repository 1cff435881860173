// ABOUTME: Page-number pagination for conversation listings
// ABOUTME: Provides list query parameters with validation and the Page response envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

use crate::constants::pagination::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::errors::{AppError, AppResult};
use crate::models::ConversationStatus;

/// Column used to order a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortField {
    /// Creation time
    #[serde(rename = "createdAt")]
    CreatedAt,
    /// Last update time
    #[default]
    #[serde(rename = "updatedAt")]
    UpdatedAt,
    /// Title, lexicographic
    #[serde(rename = "title")]
    Title,
}

/// Direction of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

/// Listing parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Restrict to one status; `None` means everything except deleted
    #[serde(default)]
    pub status: Option<ConversationStatus>,
    /// Page size (1..=100)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Sort column
    #[serde(default)]
    pub sort_by: SortField,
    /// Sort direction
    #[serde(default)]
    pub sort_order: SortOrder,
}

const fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

const fn default_page() -> u32 {
    1
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ListQuery {
    /// Check limit and page bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `limit` is outside 1..=100 or `page` is 0
    pub fn validate(&self) -> AppResult<()> {
        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(AppError::invalid_input(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        if self.page == 0 {
            return Err(AppError::invalid_input("page must be at least 1"));
        }
        Ok(())
    }

    /// Number of rows to skip for the requested page
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total matching items across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    /// Page size used
    pub limit: u32,
    /// Total number of pages, `ceil(total / limit)`
    pub pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page, computing the page count
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, query: &ListQuery) -> Self {
        let limit = u64::from(query.limit.max(1));
        Self {
            items,
            total,
            page: query.page,
            limit: query.limit,
            pages: total.div_ceil(limit),
        }
    }
}
