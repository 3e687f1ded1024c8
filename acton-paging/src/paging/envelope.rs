//! The paging envelope returned to callers

use serde::{Deserialize, Serialize};

use super::error::PagingError;
use crate::repository::FetchResult;

/// One page of rows plus the totals needed to render pagination
///
/// Serializes in camelCase: `totalItems`, `rows`, `currentPage`,
/// `totalPages`, `size`.
///
/// # Example
///
/// ```rust
/// use acton_paging::paging::PagingEnvelope;
/// use acton_paging::repository::FetchResult;
///
/// let envelope = PagingEnvelope::derive(FetchResult::new(vec!["a", "b"], 7), 2, 2).unwrap();
/// assert_eq!(envelope.total_pages, 4);
/// assert!(envelope.has_next());
/// assert!(envelope.has_prev());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingEnvelope<R> {
    /// Total matching rows, ignoring pagination
    pub total_items: u64,
    /// The rows of the current page
    pub rows: Vec<R>,
    /// Current page number (1-indexed)
    pub current_page: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Page size used for this page
    pub size: u64,
}

impl<R> PagingEnvelope<R> {
    /// Derive the envelope from a fetch result
    ///
    /// A zero `size` is an invariant violation and fails with
    /// [`PagingError::InvalidPageSize`].
    pub fn derive(result: FetchResult<R>, page: u64, size: u64) -> Result<Self, PagingError> {
        let total_pages = total_pages(result.count, size).ok_or(PagingError::InvalidPageSize)?;

        Ok(Self {
            total_items: result.count,
            rows: result.rows,
            current_page: page,
            total_pages,
            size,
        })
    }

    /// Whether a page follows this one
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether a page precedes this one
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Map each row to a new type, keeping the totals
    pub fn map_rows<U, F>(self, f: F) -> PagingEnvelope<U>
    where
        F: FnMut(R) -> U,
    {
        PagingEnvelope {
            total_items: self.total_items,
            rows: self.rows.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            size: self.size,
        }
    }
}

/// Number of pages needed for `total` items, rounding up
///
/// Returns `None` for a zero `size`.
///
/// # Example
///
/// ```rust
/// use acton_paging::paging::total_pages;
///
/// assert_eq!(total_pages(10, 5), Some(2));
/// assert_eq!(total_pages(1, 5), Some(1));
/// assert_eq!(total_pages(0, 5), Some(0));
/// assert_eq!(total_pages(3, 0), None);
/// ```
#[must_use]
pub const fn total_pages(total: u64, size: u64) -> Option<u64> {
    if size == 0 {
        None
    } else {
        Some(total.div_ceil(size))
    }
}
