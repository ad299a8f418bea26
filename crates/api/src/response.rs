//! Shared response envelope types for API handlers.
//!
//! Responses use a `{ "data": ... }` envelope. Paginated listings add the
//! paging fields next to `data`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "count", "total_count", "pages", "current_page", "data" }` envelope
/// for page-numbered listings.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    /// Items on this page.
    pub count: usize,
    pub total_count: i64,
    pub pages: i64,
    pub current_page: i64,
    pub data: Vec<T>,
}

impl<T: Serialize> PageResponse<T> {
    pub fn new(data: Vec<T>, total_count: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 {
            (total_count + limit - 1) / limit
        } else {
            0
        };
        Self {
            count: data.len(),
            total_count,
            pages,
            current_page: page,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_round_up() {
        let page = PageResponse::new(vec![1, 2, 3], 101, 2, 50);
        assert_eq!(page.pages, 3);
        assert_eq!(page.count, 3);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page: PageResponse<i32> = PageResponse::new(vec![], 0, 1, 50);
        assert_eq!(page.pages, 0);
    }
}
