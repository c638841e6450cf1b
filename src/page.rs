//! Incremental reveal of an already-fetched result list.
//!
//! Queries return at most [`crate::query::QUERY_LIMIT`] records in one shot;
//! the paginator exposes them to a renderer in fixed-size pages to bound the
//! initial render cost. It never fetches anything itself.

/// Records revealed per page.
pub const PAGE_SIZE: usize = 20;

/// Reveals a prefix of a bounded result list, one page at a time.
///
/// Invariant: the visible subset is always a prefix of the full list, its
/// length never decreases between advances, and never exceeds the list.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    page: usize,
    visible_len: usize,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_page_size(items, PAGE_SIZE)
    }

    pub fn with_page_size(items: Vec<T>, page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be positive");
        let visible_len = items.len().min(page_size);
        Paginator { items, page_size, page: 1, visible_len }
    }

    /// Replaces the upstream result list. Page index returns to 1 and the
    /// visible subset to the first page of the new list, regardless of
    /// prior state.
    pub fn reset(&mut self, items: Vec<T>) {
        self.visible_len = items.len().min(self.page_size);
        self.items = items;
        self.page = 1;
    }

    /// Reveals the next page. A no-op once everything is visible.
    pub fn advance(&mut self) {
        let start = self.page * self.page_size;
        if start >= self.items.len() {
            return;
        }
        self.visible_len = self.items.len().min(start + self.page_size);
        self.page += 1;
    }

    pub fn has_more(&self) -> bool {
        self.visible_len < self.items.len()
    }

    /// The currently revealed prefix.
    pub fn visible(&self) -> &[T] {
        &self.items[..self.visible_len]
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn initial_page_is_first_slice() {
        let pager = Paginator::new(numbers(45));
        assert_eq!(pager.visible(), &numbers(20)[..]);
        assert_eq!(pager.page(), 1);
        assert!(pager.has_more());
    }

    #[test]
    fn forty_five_records_take_two_advances() {
        let mut pager = Paginator::new(numbers(45));
        assert_eq!(pager.visible().len(), 20);

        pager.advance();
        assert_eq!(pager.visible().len(), 40);
        assert!(pager.has_more());

        pager.advance();
        assert_eq!(pager.visible().len(), 45);
        assert!(!pager.has_more());
    }

    #[test]
    fn advances_to_reveal_all_is_ceil_n_over_page_size_minus_one() {
        for n in [0usize, 1, 19, 20, 21, 40, 45, 50] {
            let mut pager = Paginator::new(numbers(n));
            let mut advances = 0;
            while pager.has_more() {
                pager.advance();
                advances += 1;
            }
            let expected = n.div_ceil(PAGE_SIZE).saturating_sub(1);
            assert_eq!(advances, expected, "n = {n}");
            assert_eq!(pager.visible().len(), n);
        }
    }

    #[test]
    fn advance_past_end_is_a_noop() {
        let mut pager = Paginator::new(numbers(5));
        assert!(!pager.has_more());
        pager.advance();
        pager.advance();
        assert_eq!(pager.visible().len(), 5);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn reset_discards_pagination_state() {
        let mut pager = Paginator::new(numbers(50));
        pager.advance();
        pager.advance();
        assert_eq!(pager.visible().len(), 50);

        pager.reset(numbers(7));
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.visible().len(), 7);
        assert!(!pager.has_more());

        pager.reset(numbers(33));
        assert_eq!(pager.visible().len(), 20);
        assert!(pager.has_more());
    }

    #[test]
    fn visible_is_always_a_prefix_and_non_decreasing() {
        let mut pager = Paginator::new(numbers(45));
        let mut prev_len = pager.visible().len();
        loop {
            assert_eq!(pager.visible(), &numbers(45)[..pager.visible().len()]);
            if !pager.has_more() {
                break;
            }
            pager.advance();
            assert!(pager.visible().len() >= prev_len);
            prev_len = pager.visible().len();
        }
    }

    #[test]
    fn empty_list() {
        let pager: Paginator<usize> = Paginator::new(Vec::new());
        assert!(pager.visible().is_empty());
        assert!(!pager.has_more());
    }
}
