//! The find-and-count collaborator contract
//!
//! The paging builder never queries data itself. It hands a [`FindOptions`]
//! record to a [`FindAndCount`] implementation and receives a
//! [`FetchResult`] back. Implementations use RPITIT (Return Position Impl
//! Trait In Traits), so no `async_trait` is needed.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_paging::repository::{FetchResult, FindAndCount, FindOptions, RepositoryResult};
//!
//! struct TaskModel {
//!     pool: PgPool,
//! }
//!
//! impl FindAndCount<Task> for TaskModel {
//!     async fn find_and_count_all(&self, options: &FindOptions) -> RepositoryResult<FetchResult<Task>> {
//!         let (sql, count_sql) = render(options);
//!         let rows = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
//!         let count: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.pool).await?;
//!         Ok(FetchResult::new(rows, count as u64))
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::RepositoryError;
use crate::paging::{Condition, Include, OrderSpec, Projection};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Everything the collaborator needs for one find-and-count call
///
/// Serializes with the ORM option names (`where`, `attributes`, `limit`,
/// `offset`, `order`, `include`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindOptions {
    /// Filter condition, `None` meaning no filter
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Condition>,
    /// Column projection
    pub attributes: Projection,
    /// Maximum number of rows to return
    pub limit: u64,
    /// Number of rows to skip
    pub offset: u64,
    /// Ordering, `None` leaving order to the collaborator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSpec>,
    /// Related models to join into each row
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<Include>,
}

impl Default for FindOptions {
    fn default() -> Self {
        let pagination = super::Pagination::default();
        Self {
            where_clause: None,
            attributes: Projection::default(),
            limit: pagination.limit,
            offset: pagination.offset,
            order: None,
            include: Vec::new(),
        }
    }
}

/// Rows of one page plus the total count ignoring limit/offset
///
/// # Example
///
/// ```rust
/// use acton_paging::repository::FetchResult;
///
/// let result = FetchResult::new(vec![1, 2, 3], 10);
/// let doubled = result.map_rows(|n| n * 2);
/// assert_eq!(doubled.rows, vec![2, 4, 6]);
/// assert_eq!(doubled.count, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult<R> {
    /// The fetched rows, in collaborator order
    pub rows: Vec<R>,
    /// Total matching rows across all pages
    pub count: u64,
}

impl<R> FetchResult<R> {
    /// Create a new fetch result
    pub fn new(rows: Vec<R>, count: u64) -> Self {
        Self { rows, count }
    }

    /// Map each row, keeping the count
    pub fn map_rows<U, F>(self, f: F) -> FetchResult<U>
    where
        F: FnMut(R) -> U,
    {
        FetchResult {
            rows: self.rows.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}

/// A data-access model able to fetch a filtered, ordered page and its total count
///
/// # Type Parameters
///
/// - `R`: The row type the model produces
pub trait FindAndCount<R>: Send + Sync {
    /// Find the rows selected by `options` and count all rows matching its condition
    ///
    /// `count` must ignore `limit` and `offset`.
    fn find_and_count_all(
        &self,
        options: &FindOptions,
    ) -> impl Future<Output = RepositoryResult<FetchResult<R>>> + Send;
}

impl<R, M> FindAndCount<R> for &M
where
    M: FindAndCount<R> + ?Sized,
{
    fn find_and_count_all(
        &self,
        options: &FindOptions,
    ) -> impl Future<Output = RepositoryResult<FetchResult<R>>> + Send {
        (**self).find_and_count_all(options)
    }
}

impl<R, M> FindAndCount<R> for Arc<M>
where
    M: FindAndCount<R> + ?Sized,
{
    fn find_and_count_all(
        &self,
        options: &FindOptions,
    ) -> impl Future<Output = RepositoryResult<FetchResult<R>>> + Send {
        (**self).find_and_count_all(options)
    }
}
