//! Pagination utilities for result tables

use serde::Serialize;

/// Page size used when the request names none
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Largest page size a request may ask for
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Rows per page
    pub page_size: u64,
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Requested page size limited to `[1, MAX_PAGE_SIZE]`
pub fn clamp_page_size(requested: Option<u64>) -> u64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use ocl_web::pagination::calculate_pagination;
///
/// // 60 results at 25 per page = 3 pages
/// let p = calculate_pagination(60, 2, 25);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(60, 99, 25);
/// assert_eq!(p.page, 3);
/// ```
pub fn calculate_pagination(total_results: u64, requested_page: u64, page_size: u64) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_results.div_ceil(page_size);
    let page = requested_page.max(1).min(total_pages.max(1));

    Pagination {
        page,
        total_pages,
        page_size,
    }
}
