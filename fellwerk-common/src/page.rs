use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Normalized page/limit pair. Absent, non-positive or out-of-range
/// inputs fall back to the defaults, so the derived offset can never go
/// negative.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: normalize(page, DEFAULT_PAGE),
            limit: normalize(limit, DEFAULT_LIMIT),
        }
    }

    #[must_use]
    pub fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn limit(self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn normalize(value: Option<i64>, default: u32) -> u32 {
    value
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}

#[must_use]
pub fn page_count(total_items: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }

    u32::try_from(total_items.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
}

/// One page of results plus the pagination metadata every list endpoint
/// reports.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            data,
            current_page: request.page(),
            total_pages: page_count(total_items, request.limit()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::page::{DEFAULT_LIMIT, DEFAULT_PAGE, Page, PageRequest, page_count};

    #[test]
    fn offset_is_pages_before_times_limit() {
        assert_eq!(PageRequest::new(Some(1), Some(10)).offset(), 0);
        assert_eq!(PageRequest::new(Some(2), Some(10)).offset(), 10);
        assert_eq!(PageRequest::new(Some(7), Some(25)).offset(), 150);
    }

    #[test]
    fn invalid_inputs_fall_back_to_defaults() {
        for request in [
            PageRequest::new(None, None),
            PageRequest::new(Some(0), Some(0)),
            PageRequest::new(Some(-3), Some(-1)),
            PageRequest::new(Some(i64::MAX), Some(i64::MIN)),
        ] {
            assert_eq!(request.page(), DEFAULT_PAGE);
            assert_eq!(request.limit(), DEFAULT_LIMIT);
            assert_eq!(request.offset(), 0);
        }
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(page_count(30, 10), 3);
        assert_eq!(page_count(1, 10), 1);
    }

    #[test]
    fn page_carries_request_metadata() {
        let request = PageRequest::new(Some(2), Some(10));
        let page = Page::new(vec!["a", "b"], request, 25);

        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
    }
}
