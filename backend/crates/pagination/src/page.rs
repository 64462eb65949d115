//! Page envelope returned by listing endpoints.

use serde::Serialize;

use crate::request::{PageRequest, RowCount};

/// One page of results together with the total number of matches.
///
/// Serialises as `{"current":1,"rowCount":10,"rows":[...],"total":42}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    current: u32,
    row_count: RowCount,
    rows: Vec<T>,
    total: u64,
}

impl<T> Page<T> {
    /// Wrap the rows fetched for `request`.
    #[must_use]
    pub const fn new(request: PageRequest, rows: Vec<T>, total: u64) -> Self {
        Self {
            current: request.current(),
            row_count: request.row_count(),
            rows,
            total,
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Page size the rows were fetched with.
    #[must_use]
    pub const fn row_count(&self) -> RowCount {
        self.row_count
    }

    /// Rows on this page.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Total number of matching rows across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Convert every row, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            current: self.current,
            row_count: self.row_count,
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
