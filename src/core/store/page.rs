use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// 1-based page selection, as read from `?page=&page_size=`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, req: &PageRequest) -> Self {
        let page_size = req.limit();
        Self {
            count,
            page: req.page(),
            page_size,
            total_pages: (count + page_size - 1) / page_size,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let req = PageRequest::default();
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let req = PageRequest::new(0, 5000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 100);

        let req = PageRequest::new(-3, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 1);
    }

    #[test]
    fn offset_follows_page_number() {
        let req = PageRequest::new(3, 20);
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 23, &PageRequest::new(1, 10));
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], 0, &PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }
}
