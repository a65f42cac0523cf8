use serde::Serialize;

use crate::bootstrap::settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub count: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

/// A clamped `page`/`limit` pair. Pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Pages below 1 become 1, limits below 1 fall back to `default_limit`
    /// and limits above `max_limit` are capped.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        let max_limit = max_limit.max(1);
        let limit = match limit {
            Some(limit) if limit >= 1 => limit,
            _ => default_limit,
        };

        PageRequest {
            page: page.unwrap_or(1).max(1),
            limit: limit.clamp(1, max_limit),
        }
    }

    /// Same as `new`, capped by the configured `max_limit`.
    pub fn from_query(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self::new(page, limit, default_limit, settings().pagination.max_limit)
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn take(&self) -> i64 {
        self.limit
    }

    pub fn paginate(&self, total: i64, count: i64) -> Pagination {
        Pagination {
            total,
            count,
            per_page: self.limit,
            current_page: self.page,
            total_pages: total_pages(total, self.limit),
        }
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(23, 5), 5);
        assert_eq!(total_pages(20, 5), 4);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(0, 5), 0);
    }

    #[test]
    fn skip_follows_page() {
        assert_eq!(PageRequest::new(Some(1), Some(5), 5, 100).skip(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(5), 5, 100).skip(), 10);
    }

    #[test]
    fn bad_values_are_clamped() {
        assert_eq!(PageRequest::new(Some(0), Some(0), 5, 100), PageRequest { page: 1, limit: 5 });
        assert_eq!(PageRequest::new(Some(-4), Some(-1), 10, 100), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(None, Some(1_000), 5, 100), PageRequest { page: 1, limit: 100 });
        assert_eq!(PageRequest::new(None, None, 5, 100), PageRequest { page: 1, limit: 5 });
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        assert_eq!(PageRequest::new(Some(i64::MAX), Some(100), 5, 100).skip(), i64::MAX);
    }

    #[test]
    fn pagination_object() {
        let page = PageRequest::new(Some(2), Some(5), 5, 100);
        assert_eq!(
            page.paginate(23, 5),
            Pagination {
                total: 23,
                count: 5,
                per_page: 5,
                current_page: 2,
                total_pages: 5,
            }
        );
    }
}
