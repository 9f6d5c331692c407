//! Pagination windows.
//!
//! A [`Pagination`] turns `(total, limit, page)` into the `(offset, limit)`
//! slice window of one page and answers the usual navigation questions.

use serde::Serialize;

use crate::error::{QuarryError, Result};

/// One page of a paginated set.
///
/// The page number is clamped into `1..=pages()`, so the window always
/// describes a valid sub-range of `[0, total)`.
///
/// ```
/// use quarry::Pagination;
///
/// let pagination = Pagination::new(23, 10, 3).unwrap();
/// assert_eq!(pagination.offset(), 20);
/// assert_eq!(pagination.limit(), 10);
/// assert_eq!(pagination.pages(), 3);
/// assert!(pagination.is_last_page());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    total: usize,
    limit: usize,
    page: usize,
}

impl Pagination {
    /// Creates the window for `page` of `total` items, `limit` per page.
    pub fn new(total: usize, limit: usize, page: usize) -> Result<Self> {
        if limit == 0 {
            return Err(QuarryError::InvalidArgument(
                "pagination limit must be at least 1".into(),
            ));
        }
        let pages = pages_for(total, limit);
        Ok(Pagination {
            total,
            limit,
            page: page.clamp(1, pages),
        })
    }

    /// Number of items skipped before this page.
    pub fn offset(&self) -> usize {
        ((self.page - 1) * self.limit).min(self.total)
    }

    /// Maximum number of items per page.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The current page, starting at 1.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Total number of items across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of pages; an empty set still has one (empty) page.
    pub fn pages(&self) -> usize {
        pages_for(self.total, self.limit)
    }

    pub fn first_page(&self) -> usize {
        1
    }

    pub fn last_page(&self) -> usize {
        self.pages()
    }

    /// Returns `true` if there is more than one page.
    pub fn has_pages(&self) -> bool {
        self.pages() > 1
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    pub fn prev_page(&self) -> Option<usize> {
        self.has_prev_page().then(|| self.page - 1)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.pages()
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next_page().then(|| self.page + 1)
    }

    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page == self.pages()
    }

    /// 1-based position of the first item on this page, 0 when empty.
    pub fn start(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based position of the last item on this page, 0 when empty.
    pub fn end(&self) -> usize {
        (self.offset() + self.limit).min(self.total)
    }
}

fn pages_for(total: usize, limit: usize) -> usize {
    total.div_ceil(limit).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_window() {
        let p = Pagination::new(25, 10, 1).unwrap();
        assert_eq!((p.offset(), p.limit()), (0, 10));
        assert_eq!((p.start(), p.end()), (1, 10));
        assert!(p.is_first_page());
        assert!(!p.has_prev_page());
        assert_eq!(p.next_page(), Some(2));
    }

    #[test]
    fn last_partial_page() {
        let p = Pagination::new(25, 10, 3).unwrap();
        assert_eq!(p.offset(), 20);
        assert_eq!((p.start(), p.end()), (21, 25));
        assert_eq!(p.prev_page(), Some(2));
        assert_eq!(p.next_page(), None);
    }

    #[test]
    fn page_is_clamped() {
        assert_eq!(Pagination::new(25, 10, 99).unwrap().page(), 3);
        assert_eq!(Pagination::new(25, 10, 0).unwrap().page(), 1);
    }

    #[test]
    fn empty_set_has_one_page() {
        let p = Pagination::new(0, 10, 4).unwrap();
        assert_eq!(p.pages(), 1);
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
        assert_eq!((p.start(), p.end()), (0, 0));
        assert!(!p.has_pages());
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(matches!(
            Pagination::new(10, 0, 1),
            Err(QuarryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn offset_never_exceeds_total() {
        for total in 0..30 {
            for limit in 1..7 {
                for page in 0..10 {
                    let p = Pagination::new(total, limit, page).unwrap();
                    assert!(p.offset() <= total);
                }
            }
        }
    }
}
