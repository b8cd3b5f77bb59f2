//! Pagination envelope.

use serde::{Deserialize, Serialize};

/// A page of results in the `{count, next, previous, results}` shape.
///
/// `count` is the total number of matching items, not the page length.
/// `next`/`previous` carry ready-to-follow URLs when the neighbouring
/// page exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page from the full ordered result set.
    ///
    /// A page past the end yields empty `results` with the full `count`.
    pub fn slice(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let count = items.len();
        let page = page.max(1);
        let per_page = per_page.max(1);
        let start = (page - 1).saturating_mul(per_page);
        let results: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(per_page)
            .collect();
        Self {
            count,
            next: None,
            previous: None,
            results,
        }
    }

    /// Whether a following page exists.
    pub fn has_next(&self, page: usize, per_page: usize) -> bool {
        page.max(1) * per_page.max(1) < self.count
    }

    /// Map the results, keeping pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_pages() {
        let items: Vec<u32> = (0..25).collect();
        let p = Page::slice(items.clone(), 1, 10);
        assert_eq!(p.count, 25);
        assert_eq!(p.results, (0..10).collect::<Vec<_>>());
        assert!(p.has_next(1, 10));

        let p = Page::slice(items.clone(), 3, 10);
        assert_eq!(p.results, (20..25).collect::<Vec<_>>());
        assert!(!p.has_next(3, 10));
    }

    #[test]
    fn test_past_the_end_is_empty_with_count() {
        let items: Vec<u32> = (0..5).collect();
        let p = Page::slice(items, 4, 10);
        assert_eq!(p.count, 5);
        assert!(p.results.is_empty());
    }
}
