//! Pagination contract shared by every feed.
//!
//! Requests carry the raw page number from the query string. The number is
//! only resolved once the total row count is known, so it can be clamped to
//! the pages that actually exist.

use serde::Serialize;

/// Posts per feed page.
pub const PAGE_SIZE: u64 = 10;

/// A requested page, before it is clamped against the row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u64,
    per_page: u64,
}

impl PageRequest {
    pub fn new(number: u64) -> Self {
        Self {
            number: number.max(1),
            per_page: PAGE_SIZE,
        }
    }

    /// Parse the `page` query parameter. Missing, non-numeric and
    /// non-positive values all mean the first page; a number too large to
    /// represent saturates and so resolves to the last page.
    pub fn from_query(raw: Option<&str>) -> Self {
        let digits = raw.map(str::trim).map(|s| s.strip_prefix('+').unwrap_or(s));
        let number = match digits {
            Some(d) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) => {
                d.parse::<u64>().unwrap_or(u64::MAX)
            }
            _ => 1,
        };
        Self::new(number)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// The page that will actually be served for `total` rows.
    pub fn resolve(&self, total: u64) -> u64 {
        self.number.min(num_pages(total, self.per_page))
    }

    /// Row offset of the resolved page.
    pub fn offset(&self, total: u64) -> u64 {
        (self.resolve(total) - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Number of pages for `total` rows. An empty listing still has one page.
pub fn num_pages(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page.max(1)).max(1)
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    /// Assemble a page from rows already fetched for `request`.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            number: request.resolve(total),
            num_pages: num_pages(total, request.per_page()),
            total,
            per_page: request.per_page(),
        }
    }

    /// Slice a fully materialised, already ordered listing.
    pub fn from_ordered(rows: Vec<T>, request: PageRequest) -> Self {
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(request.offset(total) as usize)
            .take(request.per_page() as usize)
            .collect();
        Self::new(items, request, total)
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_defaults_to_first_page() {
        assert_eq!(PageRequest::from_query(None), PageRequest::new(1));
        assert_eq!(PageRequest::from_query(Some("abc")), PageRequest::new(1));
        assert_eq!(PageRequest::from_query(Some("0")), PageRequest::new(1));
        assert_eq!(PageRequest::from_query(Some("-4")), PageRequest::new(1));
        assert_eq!(PageRequest::from_query(Some("3")), PageRequest::new(3));
        assert_eq!(PageRequest::from_query(Some(" +3 ")), PageRequest::new(3));
        assert_eq!(PageRequest::from_query(Some("1.5")), PageRequest::new(1));
    }

    #[test]
    fn test_oversized_page_number_is_last_page() {
        let request = PageRequest::from_query(Some("99999999999999999999"));
        assert_eq!(request, PageRequest::new(u64::MAX));
        assert_eq!(request.resolve(25), 3);
        assert_eq!(request.offset(25), 20);
        assert_eq!(PageRequest::from_query(Some("-99999999999999999999")), PageRequest::new(1));
    }

    #[test]
    fn test_resolve_clamps_to_last_page() {
        let request = PageRequest::new(99);
        assert_eq!(request.resolve(25), 3);
        assert_eq!(request.offset(25), 20);
        assert_eq!(request.resolve(0), 1);
        assert_eq!(request.offset(0), 0);
    }

    #[test]
    fn test_num_pages() {
        assert_eq!(num_pages(0, 10), 1);
        assert_eq!(num_pages(10, 10), 1);
        assert_eq!(num_pages(11, 10), 2);
    }

    #[test]
    fn test_from_ordered_slices_requested_page() {
        let rows: Vec<u32> = (1..=23).collect();
        let page = Page::from_ordered(rows, PageRequest::new(3));

        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.number, 3);
        assert_eq!(page.num_pages, 3);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.previous_number(), Some(2));
        assert_eq!(page.next_number(), None);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page: Page<u32> = Page::from_ordered(Vec::new(), PageRequest::new(5));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }
}
