use serde::Serialize;

/// Which page of a listing to return, from the `page_num` and `page_size`
/// query parameters. Pages count from 1 and hold at most 100 items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromForm)]
pub struct PaginationRequest {
    #[field(default = 1, validate = range(1..))]
    pub page_num: u32,
    #[field(default = 20, validate = range(1..=100))]
    pub page_size: u32,
}

impl PaginationRequest {
    /// Number of items before this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page_num - 1) * u64::from(self.page_size)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn to_paginated<T>(self, total: u64, items: Vec<T>) -> Paginated<T> {
        Paginated {
            items,
            pagination: PaginationResult {
                page_num: self.page_num,
                page_size: self.page_size,
                total,
            },
        }
    }
}

/// One page of a listing.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationResult,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PaginationResult {
    pub page_num: u32,
    pub page_size: u32,
    /// Total items across all pages.
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_counts_earlier_pages() {
        let first = PaginationRequest {
            page_num: 1,
            page_size: 20,
        };
        assert_eq!(first.skip(), 0);

        let third = PaginationRequest {
            page_num: 3,
            page_size: 20,
        };
        assert_eq!(third.skip(), 40);

        let page = third.to_paginated(45, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(page.items.len(), 5);
        assert_eq!(
            page.pagination,
            PaginationResult {
                page_num: 3,
                page_size: 20,
                total: 45
            }
        );
    }
}
