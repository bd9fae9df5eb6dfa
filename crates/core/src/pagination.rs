//! Page state for paginated panels.

use serde::Serialize;

/// Rows per page for every write-history panel.
pub const PAGE_SIZE: i64 = 20;

/// Zero-based page position of one panel.
///
/// `offset` is always `page_index * page_size` and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    page_index: u32,
    page_size: i64,
}

impl Default for PageState {
    fn default() -> Self {
        Self::at(0)
    }
}

impl PageState {
    /// Page `page_index` with the standard page size.
    pub fn at(page_index: u32) -> Self {
        Self {
            page_index,
            page_size: PAGE_SIZE,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page_index) * self.page_size
    }

    pub fn next(&mut self) {
        self.page_index = self.page_index.saturating_add(1);
    }

    /// Step back one page, stopping at the first page.
    pub fn prev(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.page_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_page_times_size() {
        assert_eq!(PageState::at(0).offset(), 0);
        assert_eq!(PageState::at(3).offset(), 60);
    }

    #[test]
    fn prev_never_goes_below_zero() {
        let mut page = PageState::default();
        page.prev();
        assert_eq!(page.page_index(), 0);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn next_then_prev_returns_to_start() {
        let mut page = PageState::default();
        page.next();
        assert_eq!(page.offset(), PAGE_SIZE);
        page.prev();
        assert_eq!(page, PageState::default());
    }

    #[test]
    fn reset_goes_to_first_page() {
        let mut page = PageState::at(7);
        page.reset();
        assert_eq!(page.page_index(), 0);
    }
}
