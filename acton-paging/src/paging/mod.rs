//! Fluent paging over a find-and-count collaborator
//!
//! [`PagingBuilder`] accumulates page, size, ordering, filter, projection,
//! inclusions and an optional row transform, then runs a single
//! [`FindAndCount`](crate::repository::FindAndCount) call and wraps the result
//! in a [`PagingEnvelope`].
//!
//! # Features
//!
//! - **Typed setters**: [`Condition`], [`OrderSpec`], [`Include`] built in Rust
//! - **JSON setters**: `set_*_value` and [`PagingBuilder::configure`] validate
//!   untyped request input and reject bad shapes with [`ConfigurationTypeError`]
//! - **Envelope**: `totalItems`, `rows`, `currentPage`, `totalPages`, `size`
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_paging::paging::{Condition, PagingBuilder};
//!
//! let mut paging = PagingBuilder::new(store.model("Task"));
//! paging.set_page(1).set_size(5).set_condition(Condition::eq("done", false));
//!
//! let envelope = paging.execute().await?;
//! assert!(envelope.rows.len() <= 5);
//! ```

mod attributes;
mod builder;
mod condition;
mod envelope;
mod error;
mod include;
mod order;

pub use attributes::{attributes_from_value, Projection};
pub use builder::{PagingBuilder, PagingConfig, TransformFn};
pub use condition::Condition;
pub use envelope::{total_pages, PagingEnvelope};
pub use error::{ConfigurationTypeError, PagingError, TransformError};
pub use include::{leaves, Include, IncludeSpec};
pub use order::{OrderItem, OrderSpec};
