//! Pagination for booking listings.
//!
//! Callers pass an `(from, size)` pair where `from` is a 1-based
//! starting-record number, not a page index. The backing page is selected by
//! integer division (`from / size`), so any `from` below `size` floors to the
//! first page. This is the one convention used everywhere in this crate.

/// Page selection derived from the caller's `(from, size)` pair.
#[derive(Clone, Copy, Debug)]
pub struct PageRequest {
    /// 1-based starting record number
    pub from: u32,
    /// items per page
    pub size: u32,
}

impl PageRequest {
    pub fn new(from: u32, size: u32) -> Self {
        Self { from, size }
    }

    /// Clamp to sane bounds and convert to a `(page index, limit)` pair.
    pub fn normalize(self) -> (u64, u64) {
        let size = self.size.clamp(1, 100);
        ((self.from / size) as u64, size as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { from: 1, size: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::PageRequest;

    #[test]
    fn from_below_size_floors_to_first_page() {
        let (page, limit) = PageRequest::new(1, 20).normalize();
        assert_eq!(page, 0);
        assert_eq!(limit, 20);
        let (page, _) = PageRequest::new(19, 20).normalize();
        assert_eq!(page, 0);
    }

    #[test]
    fn page_index_is_integer_division() {
        let (page, limit) = PageRequest::new(40, 20).normalize();
        assert_eq!(page, 2);
        assert_eq!(limit, 20);
        let (page, _) = PageRequest::new(41, 20).normalize();
        assert_eq!(page, 2);
    }

    #[test]
    fn size_is_clamped() {
        let (_, limit) = PageRequest::new(1, 1000).normalize();
        assert_eq!(limit, 100);
        let (_, limit) = PageRequest::new(1, 0).normalize();
        assert_eq!(limit, 1);
    }

    #[test]
    fn default_values_are_sane() {
        let d = PageRequest::default();
        assert_eq!(d.from, 1);
        assert_eq!(d.size, 20);
    }
}
