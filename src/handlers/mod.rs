//! HTTP handlers for users, day-logs, tags and reports.

pub mod daylog;
pub mod report;
pub mod tag;
pub mod user;

use crate::repository::Filters;
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// `page`, `page_size` and `sort` query parameters shared by list routes.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
}

impl PageParams {
    pub fn into_filters(self, default_sort: &str, sort_safelist: &'static [&'static str]) -> Filters {
        Filters {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort: self.sort.unwrap_or_else(|| default_sort.to_string()),
            sort_safelist,
        }
    }
}
