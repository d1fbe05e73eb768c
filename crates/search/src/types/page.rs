//! Page types for result collections.
//!
//! A page is one bulk-fetch batch: a contiguous slice of the captured id
//! list together with whatever the gateway returned for it.

use serde::{Deserialize, Serialize};

/// Position of a page within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Zero-based page number.
    pub index: usize,

    /// Offset of the first id of this page in the id list.
    pub offset: usize,

    /// Total number of ids in the collection.
    pub total: usize,

    /// Whether another page follows.
    pub has_next: bool,
}

impl PageInfo {
    /// Computes the info for page `index` of a list of `total` ids.
    ///
    /// Offsets saturate, so an index far past the end yields an offset at or
    /// beyond `total` rather than wrapping.
    pub fn for_index(index: usize, batch_size: usize, total: usize) -> Self {
        let offset = index.saturating_mul(batch_size);
        Self {
            index,
            offset,
            total,
            has_next: offset.saturating_add(batch_size) < total,
        }
    }

    /// Returns the exclusive end offset for the given batch size.
    pub fn end(&self, batch_size: usize) -> usize {
        self.offset.saturating_add(batch_size).min(self.total)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,

    /// Pagination information.
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Creates a new page with the given items and page info.
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Returns the number of pages needed for `total` ids.
pub fn page_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_boundaries() {
        let first = PageInfo::for_index(0, 50, 120);
        assert_eq!(first.offset, 0);
        assert!(first.has_next);
        assert_eq!(first.end(50), 50);

        let last = PageInfo::for_index(2, 50, 120);
        assert_eq!(last.offset, 100);
        assert!(!last.has_next);
        assert_eq!(last.end(50), 120);

        let exact = PageInfo::for_index(1, 50, 100);
        assert!(!exact.has_next);
    }

    #[test]
    fn test_page_info_huge_index_saturates() {
        let far = PageInfo::for_index(usize::MAX / 2, 50, 3);
        assert_eq!(far.offset, usize::MAX);
        assert!(far.offset >= far.total);
        assert!(!far.has_next);
        assert_eq!(far.end(50), 3);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 50), 0);
        assert_eq!(page_count(1, 50), 1);
        assert_eq!(page_count(150, 50), 3);
        assert_eq!(page_count(151, 50), 4);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], PageInfo::for_index(0, 5, 3));
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.len(), 3);
    }
}
