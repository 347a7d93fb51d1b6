//! Offset pagination arithmetic shared by the API and the client feed

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book::Book;

/// Inclusive row range `[from, to]` to fetch for a page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub from: i64,
    pub to: i64,
}

impl PageWindow {
    /// Compute the window for `page`.
    ///
    /// In append mode only the requested page is fetched. Otherwise every row
    /// from the start up to the end of `page` is fetched, so a reload keeps
    /// all pages already shown. Returns `None` when the window end does not
    /// fit in an `i64`.
    pub fn new(page: i64, per_page: i64, append: bool) -> Option<Self> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let end = page.checked_mul(per_page)?;
        let from = if append { end - per_page } else { 0 };
        Some(Self {
            page,
            per_page,
            from,
            to: end - 1,
        })
    }

    pub fn offset(&self) -> i64 {
        self.from
    }

    pub fn limit(&self) -> i64 {
        self.to - self.from + 1
    }

    /// Whether rows remain after this window, given the total row count
    pub fn has_more(&self, total: i64) -> bool {
        self.to + 1 < total
    }
}

/// One window of the book catalog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookPage {
    /// Rows of the requested window
    pub items: Vec<Book>,
    /// Total number of matching rows
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
    /// More rows exist after this window
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_window() {
        let window = PageWindow::new(3, 10, true).unwrap();
        assert_eq!((window.from, window.to), (20, 29));
        assert_eq!(window.limit(), 10);
    }

    #[test]
    fn test_reload_window_covers_previous_pages() {
        let window = PageWindow::new(3, 10, false).unwrap();
        assert_eq!((window.from, window.to), (0, 29));
        assert_eq!(window.limit(), 30);
    }

    #[test]
    fn test_page_is_clamped() {
        let window = PageWindow::new(0, 10, true).unwrap();
        assert_eq!(window.page, 1);
        assert_eq!((window.from, window.to), (0, 9));

        let window = PageWindow::new(-4, 10, false).unwrap();
        assert_eq!((window.from, window.to), (0, 9));
    }

    #[test]
    fn test_has_more() {
        let window = PageWindow::new(2, 10, true).unwrap();
        assert!(window.has_more(21));
        assert!(!window.has_more(20));
        assert!(!window.has_more(5));
    }

    #[test]
    fn test_overflowing_window_is_rejected() {
        assert_eq!(PageWindow::new(i64::MAX, 10, true), None);
        assert_eq!(PageWindow::new(i64::MAX / 2, 3, false), None);

        let last = PageWindow::new(i64::MAX / 10, 10, true).unwrap();
        assert_eq!(last.limit(), 10);
        assert_eq!(last.to, i64::MAX / 10 * 10 - 1);
    }
}
