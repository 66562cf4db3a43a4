use std::ops::Range;

/// Page size of the dashboard list widgets.
pub const PAGE_SIZE: usize = 5;

/// Zero-based page cursor over a client-side list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    pub fn has_multiple_pages(&self, len: usize) -> bool {
        self.page_count(len) > 1
    }

    fn last_page(&self, len: usize) -> usize {
        self.page_count(len).saturating_sub(1)
    }

    /// Pull the cursor back inside `[0, page_count - 1]` after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.min(self.last_page(len));
    }

    pub fn range(&self, len: usize) -> Range<usize> {
        let page = self.page.min(self.last_page(len));
        let start = (page * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    pub fn items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.page < self.last_page(len)
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn next(&mut self, len: usize) {
        if self.has_next(len) {
            self.page += 1;
        }
    }

    pub fn jump(&mut self, page: usize, len: usize) {
        self.page = page.min(self.last_page(len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_no_pages() {
        let p = Paginator::default();
        assert_eq!(p.page_count(0), 0);
        assert_eq!(p.range(0), 0..0);
        assert!(!p.has_next(0));
    }

    #[test]
    fn next_stops_on_last_page() {
        let mut p = Paginator::default();
        p.next(7);
        p.next(7);
        assert_eq!(p.page(), 1);
        assert_eq!(p.items(&[1, 2, 3, 4, 5, 6, 7]), &[6, 7]);
        p.prev();
        p.prev();
        assert_eq!(p.page(), 0);
    }

    #[test]
    fn clamp_after_shrink() {
        let mut p = Paginator::default();
        p.jump(3, 20);
        assert_eq!(p.page(), 3);
        p.clamp(6);
        assert_eq!(p.page(), 1);
        p.clamp(0);
        assert_eq!(p.page(), 0);
    }
}
