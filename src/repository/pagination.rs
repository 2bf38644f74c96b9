//! Page/sort request parameters and the metadata returned with a page.

use crate::error::AppError;
use crate::service::validation::{permitted, Validator};
use serde::Serialize;

pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Paging and sorting for one list request. `sort` is a column name,
/// optionally prefixed with `-` for descending order, and must appear in
/// `sort_safelist` (which lists both forms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(self.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
        v.check(
            permitted(&self.sort.as_str(), self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Column to order by, without the direction prefix. Only safelisted
    /// values get through, since the result is spliced into SQL.
    pub fn sort_column(&self) -> Result<&str, AppError> {
        if self.sort_safelist.contains(&self.sort.as_str()) {
            Ok(self.sort.trim_start_matches('-'))
        } else {
            Err(AppError::invalid("sort", "invalid sort value"))
        }
    }

    pub fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination summary for one page of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// All fields are zero when there are no records.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }
    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
