//! # acton-paging
//!
//! Fluent paging over any data-access model that can "find and count all".
//! Configure page, size, ordering, filter, projection and related-model
//! inclusions, execute once, and get back a page envelope with
//! `totalItems`, `rows`, `currentPage`, `totalPages` and `size`.
//!
//! ## Features
//!
//! - **Paging builder**: typed and JSON setters with shape validation
//! - **Collaborator contract**: [`repository::FindAndCount`], implemented by your ORM layer
//! - **In-memory store**: [`repository::MemoryStore`] behind the `memory` feature
//! - **Configuration**: default and maximum page sizes via Figment (TOML + env)
//! - **Observability**: structured JSON logging through `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_paging::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let settings = PagingSettings::load()?;
//!     init_tracing(&settings)?;
//!
//!     let store = MemoryStore::new();
//!     store
//!         .define("Task", (1..=12).map(|id| json!({"id": id, "name": format!("Task {id}")})))
//!         .await;
//!
//!     let mut paging = PagingBuilder::with_settings(store.model("Task"), &settings);
//!     paging.configure(&json!({"page": 2, "order": [["id", "DESC"]]}))?;
//!
//!     let envelope = paging.execute().await?;
//!     println!("{}", serde_json::to_string(&envelope)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod paging;
pub mod repository;

/// Commonly used types
pub mod prelude {
    pub use crate::config::PagingSettings;
    pub use crate::error::{Error, Result};
    pub use crate::observability::{init_tracing, shutdown_tracing};

    pub use crate::paging::{
        Condition, ConfigurationTypeError, Include, IncludeSpec, OrderSpec, PagingBuilder,
        PagingEnvelope, PagingError, Projection, TransformError,
    };

    pub use crate::repository::{
        FetchResult, FilterOperator, FindAndCount, FindOptions, OrderDirection, Pagination,
        RepositoryError, RepositoryErrorKind, RepositoryResult,
    };

    #[cfg(feature = "memory")]
    pub use crate::repository::{MemoryModel, MemoryStore};
}
