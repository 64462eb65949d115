//! Page request and page envelope primitives shared by listing endpoints.
//!
//! Listing endpoints accept bootgrid-style parameters: a 1-based `current`
//! page, a `rowCount` page size where `-1` asks for every row, and an optional
//! search phrase handled by the caller. Responses are rendered as
//! `{current, rowCount, rows, total}`.
//!
//! # Examples
//! ```
//! use pagination::{Page, PageRequest, RowCount};
//!
//! let request = PageRequest::new(2, RowCount::limited(10).expect("valid size"))
//!     .expect("valid request");
//! assert_eq!(request.offset(), 10);
//! assert_eq!(request.limit(), Some(10));
//!
//! let page = Page::new(request, vec!["eleventh"], 11);
//! assert_eq!(page.total(), 11);
//! ```

mod page;
mod request;

pub use page::Page;
pub use request::{
    DEFAULT_ROW_COUNT, MAX_ROW_COUNT, PageRequest, PageRequestError, RowCount,
};
