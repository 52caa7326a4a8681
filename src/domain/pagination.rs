use serde::Serialize;

/// Where the displayed records sit within the full result set.
///
/// `page` and `total_pages` are never less than 1, even for an empty
/// result. `page` is kept as the service reported it, so it can lie past the
/// end when the result set shrank under it; see
/// [`is_past_end`](Self::is_past_end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    page: u32,
    total_pages: u32,
    total_items: u64,
}

impl Default for PaginationInfo {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl PaginationInfo {
    /// Build pagination info from values reported by the service.
    ///
    /// Zero values are raised to 1.
    #[must_use]
    pub fn new(page: u32, total_pages: u32, total_items: u64) -> Self {
        Self {
            page: page.max(1),
            total_pages: total_pages.max(1),
            total_items,
        }
    }

    /// The current page (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of pages available.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Number of records across all pages.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Whether there is a page after the current one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether there is a page before the current one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether the page lies beyond the last one, which happens when records
    /// are removed while a later page is displayed. Such a page is always
    /// empty.
    #[must_use]
    pub const fn is_past_end(&self) -> bool {
        self.page > self.total_pages
    }
}

/// Guards page navigation against out-of-range requests.
///
/// The controller never fetches anything itself; it only decides whether a
/// requested page is acceptable and, if so, reports it back for the caller
/// to act on.
#[derive(Debug, Clone, Copy)]
pub struct PaginationController {
    current: u32,
    total_pages: u32,
}

impl PaginationController {
    /// A controller positioned at `current` within `info.total_pages()`.
    #[must_use]
    pub const fn new(current: u32, info: &PaginationInfo) -> Self {
        Self {
            current,
            total_pages: info.total_pages(),
        }
    }

    /// Returns `page` if it lies within `1..=total_pages`, otherwise `None`.
    #[must_use]
    pub const fn go_to(&self, page: u32) -> Option<u32> {
        if page >= 1 && page <= self.total_pages {
            Some(page)
        } else {
            None
        }
    }

    /// The page after the current one, if there is one.
    #[must_use]
    pub const fn next(&self) -> Option<u32> {
        match self.current.checked_add(1) {
            Some(page) => self.go_to(page),
            None => None,
        }
    }

    /// The page before the current one, if there is one.
    #[must_use]
    pub const fn previous(&self) -> Option<u32> {
        match self.current.checked_sub(1) {
            Some(page) => self.go_to(page),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn controller(current: u32, total_pages: u32) -> PaginationController {
        PaginationController::new(current, &PaginationInfo::new(current, total_pages, 0))
    }

    #[test_case(0; "zero")]
    #[test_case(4; "past the end")]
    #[test_case(u32::MAX; "far past the end")]
    fn out_of_range_is_rejected(page: u32) {
        assert_eq!(controller(2, 3).go_to(page), None);
    }

    #[test_case(1; "first")]
    #[test_case(2; "middle")]
    #[test_case(3; "last")]
    fn in_range_is_accepted(page: u32) {
        assert_eq!(controller(2, 3).go_to(page), Some(page));
    }

    #[test]
    fn next_and_previous_stop_at_the_edges() {
        assert_eq!(controller(1, 3).previous(), None);
        assert_eq!(controller(1, 3).next(), Some(2));
        assert_eq!(controller(3, 3).next(), None);
        assert_eq!(controller(3, 3).previous(), Some(2));
    }

    #[test]
    fn single_page_allows_only_page_one() {
        let controller = controller(1, 1);
        assert_eq!(controller.go_to(1), Some(1));
        assert_eq!(controller.next(), None);
        assert_eq!(controller.previous(), None);
    }

    #[test]
    fn info_normalises_service_values() {
        let info = PaginationInfo::new(0, 0, 0);
        assert_eq!(info.page(), 1);
        assert_eq!(info.total_pages(), 1);

        let info = PaginationInfo::new(4, 4, 37);
        assert!(!info.has_next());
        assert!(info.has_previous());
        assert!(!info.is_past_end());
    }

    #[test]
    fn page_beyond_the_last_is_kept() {
        let info = PaginationInfo::new(3, 2, 20);
        assert_eq!(info.page(), 3);
        assert!(info.is_past_end());
        assert!(!info.has_next());
    }
}
