//! The data-access side of paging
//!
//! This module defines the contract the paging builder delegates to and the
//! vocabulary both sides share.
//!
//! # Features
//!
//! - **Collaborator contract**: [`FindAndCount`] returns one page of rows plus
//!   the unpaginated count
//! - **Options record**: [`FindOptions`] carries where, attributes, limit,
//!   offset, order and include
//! - **Pagination**: [`Pagination`] turns page and size into limit and offset
//! - **In-memory store**: [`MemoryStore`] (feature `memory`) evaluates
//!   [`FindOptions`] over JSON rows
//!
//! # Example
//!
//! ```rust
//! use acton_paging::repository::{FindOptions, Pagination};
//!
//! let options = FindOptions::default();
//! assert_eq!(Pagination::new(options.offset, options.limit), Pagination::page(1, 5));
//! ```

mod error;
#[cfg(feature = "memory")]
mod memory;
mod pagination;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
#[cfg(feature = "memory")]
pub use memory::{MemoryModel, MemoryStore};
pub use pagination::{
    FilterOperator, OrderDirection, Pagination, ParseDirectionError, DEFAULT_PAGE_SIZE,
};
pub use traits::{FetchResult, FindAndCount, FindOptions, RepositoryResult};
