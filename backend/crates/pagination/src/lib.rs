//! Offset pagination primitives shared by list endpoints.
//!
//! Callers hand raw, possibly missing or out-of-range, page parameters to
//! [`PageRequest::normalise`] and receive a request whose page number is at
//! least one and whose page size sits inside `[1, MAX_PAGE_SIZE]`. Adapters
//! then read [`PageRequest::limit`] and [`PageRequest::offset`] to build
//! storage queries, and wrap the rows in a [`Page`] that carries the total
//! count and derived page count.

use serde::{Deserialize, Serialize};

/// Page size used when the caller omits one or supplies a non-positive value.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// First page number; pages are 1-based.
pub const FIRST_PAGE: u32 = 1;

/// Normalised page request.
///
/// ## Invariants
/// - `page >= 1`.
/// - `1 <= page_size <= MAX_PAGE_SIZE`.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::normalise(Some(3), Some(20));
/// assert_eq!(request.offset(), 40);
/// assert_eq!(request.limit(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: FIRST_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Clamp raw page parameters into a valid request.
    ///
    /// - Missing or non-positive page sizes fall back to [`DEFAULT_PAGE_SIZE`].
    /// - Page sizes above [`MAX_PAGE_SIZE`] are capped.
    /// - Missing or non-positive page numbers fall back to [`FIRST_PAGE`].
    #[must_use]
    pub fn normalise(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page_size = match page_size {
            Some(size) if size > 0 => {
                u32::try_from(size.min(i64::from(MAX_PAGE_SIZE))).unwrap_or(MAX_PAGE_SIZE)
            }
            _ => DEFAULT_PAGE_SIZE,
        };
        let page = match page {
            Some(number) if number >= i64::from(FIRST_PAGE) => {
                u32::try_from(number).unwrap_or(u32::MAX)
            }
            _ => FIRST_PAGE,
        };
        Self { page, page_size }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Maximum number of rows a storage query should return.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Number of rows to skip: `(page - 1) * page_size`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - FIRST_PAGE) * i64::from(self.page_size)
    }
}

/// One page of results together with the totals needed to navigate.
///
/// # Examples
/// ```
/// use pagination::{Page, PageRequest};
///
/// let page = Page::new(PageRequest::normalise(Some(2), Some(2)), vec!["c", "d"], 5);
/// assert_eq!(page.total_pages(), 3);
/// assert_eq!(page.page(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Wrap rows fetched for `request` with the total row count.
    #[must_use]
    pub const fn new(request: PageRequest, items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Rows in storage order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page and return its rows.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Total rows matching the query across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Current 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.request.page()
    }

    /// Page size the rows were fetched with.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.request.page_size()
    }

    /// `ceil(total / page_size)`; zero when there are no rows.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.request.page_size()))
    }

    /// Transform every row while keeping order and totals.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}
