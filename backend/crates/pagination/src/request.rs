//! Validated page requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when the caller omits `rowCount`.
pub const DEFAULT_ROW_COUNT: u32 = 10;
/// Largest bounded page size a caller may ask for.
pub const MAX_ROW_COUNT: u32 = 100;

const ALL_ROWS_SENTINEL: i64 = -1;

/// Errors raised when raw paging parameters cannot form a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// `current` was zero or negative.
    #[error("current page must be at least 1, got {value}")]
    InvalidCurrent {
        /// Rejected value.
        value: i64,
    },
    /// `rowCount` was zero or a negative value other than `-1`.
    #[error("row count must be positive or -1 for all rows, got {value}")]
    InvalidRowCount {
        /// Rejected value.
        value: i64,
    },
    /// `rowCount` exceeded [`MAX_ROW_COUNT`].
    #[error("row count must be at most {max}, got {value}")]
    RowCountTooLarge {
        /// Rejected value.
        value: i64,
        /// Largest accepted value.
        max: u32,
    },
}

/// Requested page size.
///
/// Serialises to the wire integer: the bounded size, or `-1` for
/// [`RowCount::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum RowCount {
    /// At most this many rows per page.
    Limited(u32),
    /// Every matching row on a single page.
    All,
}

impl RowCount {
    /// Build a bounded row count, rejecting zero and values over
    /// [`MAX_ROW_COUNT`].
    pub fn limited(count: u32) -> Result<Self, PageRequestError> {
        Self::try_from(i64::from(count))
    }

    /// Maximum number of rows on the page, or `None` when unbounded.
    #[must_use]
    pub const fn limit(self) -> Option<u32> {
        match self {
            Self::Limited(count) => Some(count),
            Self::All => None,
        }
    }
}

impl Default for RowCount {
    fn default() -> Self {
        Self::Limited(DEFAULT_ROW_COUNT)
    }
}

impl From<RowCount> for i64 {
    fn from(value: RowCount) -> Self {
        match value {
            RowCount::Limited(count) => Self::from(count),
            RowCount::All => ALL_ROWS_SENTINEL,
        }
    }
}

impl TryFrom<i64> for RowCount {
    type Error = PageRequestError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == ALL_ROWS_SENTINEL {
            return Ok(Self::All);
        }
        if value < 1 {
            return Err(PageRequestError::InvalidRowCount { value });
        }
        match u32::try_from(value) {
            Ok(count) if count <= MAX_ROW_COUNT => Ok(Self::Limited(count)),
            _ => Err(PageRequestError::RowCountTooLarge {
                value,
                max: MAX_ROW_COUNT,
            }),
        }
    }
}

/// Validated request for one page of results.
///
/// ## Invariants
/// - `current` is 1-based and never zero.
/// - When `row_count` is [`RowCount::All`] the request is normalised to the
///   first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    current: u32,
    row_count: RowCount,
}

impl PageRequest {
    /// Build a request for page `current` (1-based).
    pub fn new(current: u32, row_count: RowCount) -> Result<Self, PageRequestError> {
        if current == 0 {
            return Err(PageRequestError::InvalidCurrent { value: 0 });
        }
        let current = if row_count == RowCount::All { 1 } else { current };
        Ok(Self { current, row_count })
    }

    /// Build a request from optional raw wire values, applying defaults for
    /// missing ones.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, RowCount, DEFAULT_ROW_COUNT};
    ///
    /// let request = PageRequest::from_raw(None, None).expect("defaults are valid");
    /// assert_eq!(request.current(), 1);
    /// assert_eq!(request.row_count(), RowCount::Limited(DEFAULT_ROW_COUNT));
    /// ```
    pub fn from_raw(current: Option<i64>, row_count: Option<i64>) -> Result<Self, PageRequestError> {
        let row_count = row_count.map_or_else(|| Ok(RowCount::default()), RowCount::try_from)?;
        let current = match current {
            None => 1,
            Some(value) => match u32::try_from(value) {
                Ok(page) if page >= 1 => page,
                _ => return Err(PageRequestError::InvalidCurrent { value }),
            },
        };
        Self::new(current, row_count)
    }

    /// 1-based page number.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Requested page size.
    #[must_use]
    pub const fn row_count(&self) -> RowCount {
        self.row_count
    }

    /// Maximum rows to fetch, or `None` for every row.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.row_count.limit()
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        match self.row_count {
            RowCount::Limited(count) => {
                u64::from(self.current.saturating_sub(1)).saturating_mul(u64::from(count))
            }
            RowCount::All => 0,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            current: 1,
            row_count: RowCount::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for raw parameter validation and offset arithmetic.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 25, 100)]
    fn offset_skips_previous_pages(#[case] current: u32, #[case] size: u32, #[case] expected: u64) {
        let request = PageRequest::new(current, RowCount::Limited(size)).expect("valid request");
        assert_eq!(request.offset(), expected);
        assert_eq!(request.limit(), Some(size));
    }

    #[rstest]
    fn all_rows_is_normalised_to_first_page() {
        let request = PageRequest::new(7, RowCount::All).expect("valid request");
        assert_eq!(request.current(), 1);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), None);
    }

    #[rstest]
    #[case(Some(0), None, PageRequestError::InvalidCurrent { value: 0 })]
    #[case(Some(-3), None, PageRequestError::InvalidCurrent { value: -3 })]
    #[case(None, Some(0), PageRequestError::InvalidRowCount { value: 0 })]
    #[case(None, Some(-2), PageRequestError::InvalidRowCount { value: -2 })]
    #[case(None, Some(101), PageRequestError::RowCountTooLarge { value: 101, max: MAX_ROW_COUNT })]
    fn invalid_raw_values_are_rejected(
        #[case] current: Option<i64>,
        #[case] row_count: Option<i64>,
        #[case] expected: PageRequestError,
    ) {
        let err = PageRequest::from_raw(current, row_count).expect_err("invalid input");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn minus_one_requests_every_row() {
        let request = PageRequest::from_raw(Some(3), Some(-1)).expect("valid request");
        assert_eq!(request.row_count(), RowCount::All);
        assert_eq!(request.current(), 1);
    }

    #[rstest]
    fn row_count_round_trips_through_wire_integer() {
        let json = serde_json::to_string(&RowCount::All).expect("serialise");
        assert_eq!(json, "-1");
        let parsed: RowCount = serde_json::from_str("25").expect("deserialise");
        assert_eq!(parsed, RowCount::Limited(25));
        assert!(serde_json::from_str::<RowCount>("0").is_err());
    }
}
