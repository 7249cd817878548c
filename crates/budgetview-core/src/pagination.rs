//! Page index, page size and last-page bound

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::EnvelopeMeta;

/// Pagination cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }
}

/// Owns the cursor and the envelope document count used for bounds.
#[derive(Debug, Clone)]
pub struct PaginationController {
    state: PageState,
    options: Vec<usize>,
    total: Option<u64>,
}

impl PaginationController {
    pub fn new(page_size: usize, options: Vec<usize>) -> CoreResult<Self> {
        if page_size == 0 {
            return Err(CoreError::InvalidPageSize { size: page_size });
        }
        Ok(Self {
            state: PageState {
                page_index: 0,
                page_size,
            },
            options,
            total: None,
        })
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn options(&self) -> &[usize] {
        &self.options
    }

    /// Document count from the last resolved envelope meta
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.state.page_index = page_index;
    }

    /// Change rows per page. Always returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> CoreResult<()> {
        if page_size == 0 {
            return Err(CoreError::InvalidPageSize { size: page_size });
        }
        self.state.page_size = page_size;
        self.state.page_index = 0;
        Ok(())
    }

    /// Back to the first page, keeping the page size
    pub fn rewind(&mut self) {
        self.state.page_index = 0;
    }

    pub fn apply_meta(&mut self, meta: EnvelopeMeta) {
        self.total = Some(meta.documents_count);
    }

    /// Drop the document count, e.g. when another envelope is selected
    pub fn forget_meta(&mut self) {
        self.total = None;
    }

    /// Whether the current page is the last one.
    ///
    /// Always false until envelope meta has resolved.
    pub fn is_last_page(&self) -> bool {
        match self.total {
            Some(total) => {
                let end = (self.state.page_index as u64 + 1).saturating_mul(self.state.page_size as u64);
                end >= total
            }
            None => false,
        }
    }

    /// Index of the last page, once the document count is known
    pub fn last_page_index(&self) -> Option<usize> {
        self.total.map(|total| {
            let size = self.state.page_size as u64;
            let pages = (total + size - 1) / size;
            pages.saturating_sub(1) as usize
        })
    }

    /// Forward navigation is blocked while a fetch is pending and on the last page
    pub fn can_go_forward(&self, pending: bool) -> bool {
        !pending && !self.is_last_page()
    }

    pub fn can_go_back(&self) -> bool {
        self.state.page_index > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(size: usize) -> PaginationController {
        PaginationController::new(size, vec![5, 10, 25]).unwrap()
    }

    #[test]
    fn test_last_page_with_25_documents() {
        let mut pages = controller(10);
        pages.apply_meta(EnvelopeMeta { documents_count: 25 });
        assert!(!pages.is_last_page());

        pages.set_page(2);
        assert!(pages.is_last_page());
        assert_eq!(pages.last_page_index(), Some(2));
    }

    #[test]
    fn test_last_page_formula() {
        for total in 0..40u64 {
            for size in 1..8usize {
                for index in 0..10usize {
                    let mut pages = controller(size);
                    pages.set_page(index);
                    pages.apply_meta(EnvelopeMeta { documents_count: total });
                    let expected = ((index + 1) * size) as u64 >= total;
                    assert_eq!(pages.is_last_page(), expected, "total={} size={} index={}", total, size, index);
                }
            }
        }
    }

    #[test]
    fn test_not_last_page_before_meta() {
        let mut pages = controller(10);
        pages.set_page(50);
        assert!(!pages.is_last_page());
        assert_eq!(pages.last_page_index(), None);

        pages.apply_meta(EnvelopeMeta { documents_count: 3 });
        assert!(pages.is_last_page());

        pages.forget_meta();
        assert!(!pages.is_last_page());
    }

    #[test]
    fn test_set_page_size_resets_index() {
        let mut pages = controller(10);
        for (index, size) in [(3, 5), (7, 25), (1, 10), (0, 1)] {
            pages.set_page(index);
            pages.set_page_size(size).unwrap();
            assert_eq!(pages.state(), PageState { page_index: 0, page_size: size });
        }
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut pages = controller(10);
        pages.set_page(2);
        assert!(matches!(pages.set_page_size(0), Err(CoreError::InvalidPageSize { size: 0 })));
        assert_eq!(pages.state(), PageState { page_index: 2, page_size: 10 });
        assert!(PaginationController::new(0, vec![]).is_err());
    }

    #[test]
    fn test_forward_blocked_by_pending_or_last_page() {
        let mut pages = controller(10);
        pages.apply_meta(EnvelopeMeta { documents_count: 25 });
        assert!(pages.can_go_forward(false));
        assert!(!pages.can_go_forward(true));

        pages.set_page(2);
        assert!(!pages.can_go_forward(false));
        assert!(pages.can_go_back());
    }

    #[test]
    fn test_offset() {
        let state = PageState { page_index: 3, page_size: 25 };
        assert_eq!(state.offset(), 75);
    }

    #[test]
    fn test_empty_envelope_has_single_page() {
        let mut pages = controller(10);
        pages.apply_meta(EnvelopeMeta { documents_count: 0 });
        assert!(pages.is_last_page());
        assert_eq!(pages.last_page_index(), Some(0));
    }
}
