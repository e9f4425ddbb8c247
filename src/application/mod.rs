//! Application layer: the pricing pipelines and fan-out orchestration.
//!
//! Services own their store ports behind `Arc<dyn …>` and are shared across
//! request handlers; no state lives outside the stores.

pub mod checkout;
pub mod notifications;
pub mod offers;
pub mod payments;

use serde::Serialize;

/// Page metadata returned by every listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

/// Slices an already-sorted result set. `page` is 1-based; zero values are
/// clamped to 1.
pub fn paginate<T>(items: Vec<T>, page: u64, limit: u64) -> Page<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total_items = items.len() as u64;
    let total_pages = total_items.div_ceil(limit);

    let start = (page - 1).saturating_mul(limit) as usize;
    let data: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    Page {
        data,
        pagination: PageMeta {
            current_page: page,
            total_pages,
            total_items,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_metadata() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 2, 10);
        assert_eq!(page.data, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.total_items, 25);
        assert!(page.pagination.has_next_page);
        assert!(page.pagination.has_prev_page);
    }

    #[test]
    fn test_paginate_past_the_end() {
        let page = paginate(vec![1, 2, 3], 5, 10);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total_pages, 1);
        assert!(!page.pagination.has_next_page);
    }

    #[test]
    fn test_paginate_clamps_zero_inputs() {
        let page = paginate(vec![1, 2, 3], 0, 0);
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.data, vec![1]);
    }
}
