//! The fluent paging builder and its executor
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_paging::prelude::*;
//! use serde_json::json;
//!
//! let mut paging = PagingBuilder::new(store.model("Task"));
//! paging
//!     .set_page(2)
//!     .set_size(10)
//!     .set_condition(Condition::eq("status", "open"))
//!     .set_order_by_value(&json!([["created_at", "DESC"]]))?;
//!
//! let envelope = paging.execute().await?;
//! println!("page {} of {}", envelope.current_page, envelope.total_pages);
//! ```
//!
//! # Concurrency
//!
//! Setters take `&mut self`, so one builder cannot be reconfigured while an
//! `execute()` borrowed from it is in flight. Sharing a builder between tasks
//! that both configure it needs the caller's own synchronization; builders do
//! not share state with each other.

use std::fmt;
use std::num::NonZeroU64;

use serde_json::Value;
use tracing::Instrument;

use super::attributes::{attributes_from_value, Projection};
use super::condition::Condition;
use super::envelope::PagingEnvelope;
use super::error::{ConfigurationTypeError, PagingError, TransformError};
use super::include::Include;
use super::order::OrderSpec;
use crate::config::PagingSettings;
use crate::repository::{FetchResult, FindAndCount, FindOptions, Pagination, DEFAULT_PAGE_SIZE};

/// Caller-supplied reshaping of a fetch result, applied before envelope derivation
pub type TransformFn<R> =
    Box<dyn Fn(FetchResult<R>) -> Result<FetchResult<R>, TransformError> + Send + Sync>;

/// Paging configuration accumulated by a [`PagingBuilder`]
///
/// `page` and `size` are either unset (falling back to defaults) or a
/// positive value; zero is not representable.
pub struct PagingConfig<R> {
    page: Option<NonZeroU64>,
    size: Option<NonZeroU64>,
    order_by: Option<OrderSpec>,
    condition: Option<Condition>,
    attributes: Option<Vec<String>>,
    associations: Vec<Include>,
    transform: Option<TransformFn<R>>,
}

impl<R> PagingConfig<R> {
    /// Explicitly set page, if any
    pub fn page(&self) -> Option<NonZeroU64> {
        self.page
    }

    /// Explicitly set page size, if any
    pub fn size(&self) -> Option<NonZeroU64> {
        self.size
    }

    /// Ordering, if set
    pub fn order_by(&self) -> Option<&OrderSpec> {
        self.order_by.as_ref()
    }

    /// Filter condition, if set
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Projected columns, `None` meaning all columns
    pub fn attributes(&self) -> Option<&[String]> {
        self.attributes.as_deref()
    }

    /// Related-model inclusions
    pub fn associations(&self) -> &[Include] {
        &self.associations
    }

    /// Whether a transform function is set
    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }
}

impl<R> Default for PagingConfig<R> {
    fn default() -> Self {
        Self {
            page: None,
            size: None,
            order_by: None,
            condition: None,
            attributes: None,
            associations: Vec::new(),
            transform: None,
        }
    }
}

impl<R> fmt::Debug for PagingConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagingConfig")
            .field("page", &self.page)
            .field("size", &self.size)
            .field("order_by", &self.order_by)
            .field("condition", &self.condition)
            .field("attributes", &self.attributes)
            .field("associations", &self.associations)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Fluent paging configuration over one [`FindAndCount`] model
///
/// # Type Parameters
///
/// - `R`: The row type the model produces
/// - `M`: The collaborator
pub struct PagingBuilder<R, M> {
    model: M,
    config: PagingConfig<R>,
    default_size: NonZeroU64,
    max_size: Option<NonZeroU64>,
}

impl<R, M> PagingBuilder<R, M>
where
    M: FindAndCount<R>,
{
    /// Create a builder with page 1 and the default page size
    pub fn new(model: M) -> Self {
        Self {
            model,
            config: PagingConfig::default(),
            default_size: NonZeroU64::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU64::MIN),
            max_size: None,
        }
    }

    /// Create a builder using the default and maximum page sizes from `settings`
    pub fn with_settings(model: M, settings: &PagingSettings) -> Self {
        Self {
            model,
            config: PagingConfig::default(),
            default_size: settings.default_size(),
            max_size: settings.max_size(),
        }
    }

    /// The collaborator this builder delegates to
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The accumulated configuration
    pub fn config(&self) -> &PagingConfig<R> {
        &self.config
    }

    /// Effective page number
    pub fn page(&self) -> u64 {
        self.config.page.map_or(1, NonZeroU64::get)
    }

    /// Effective page size
    pub fn size(&self) -> u64 {
        self.config.size.unwrap_or(self.default_size).get()
    }

    // ------------------------------------------------------------------
    // Typed setters
    // ------------------------------------------------------------------

    /// Set the page number (1-indexed)
    ///
    /// Zero keeps the current page; use [`reset_page`](Self::reset_page) to
    /// go back to the default.
    pub fn set_page(&mut self, page: u64) -> &mut Self {
        match NonZeroU64::new(page) {
            Some(page) => self.config.page = Some(page),
            None => tracing::debug!(page = self.page(), "Ignoring zero page, keeping current page"),
        }
        self
    }

    /// Set the page size
    ///
    /// Zero keeps the current size. Sizes above the configured maximum are
    /// clamped to it.
    pub fn set_size(&mut self, size: u64) -> &mut Self {
        let Some(mut size) = NonZeroU64::new(size) else {
            tracing::debug!(size = self.size(), "Ignoring zero page size, keeping current size");
            return self;
        };
        if let Some(max) = self.max_size {
            if size > max {
                tracing::warn!(requested = size.get(), max = max.get(), "Clamping page size");
                size = max;
            }
        }
        self.config.size = Some(size);
        self
    }

    /// Go back to page 1
    pub fn reset_page(&mut self) -> &mut Self {
        self.config.page = None;
        self
    }

    /// Go back to the default page size
    pub fn reset_size(&mut self) -> &mut Self {
        self.config.size = None;
        self
    }

    /// Set the ordering
    pub fn set_order_by(&mut self, order_by: OrderSpec) -> &mut Self {
        self.config.order_by = Some(order_by);
        self
    }

    /// Remove the ordering
    pub fn clear_order_by(&mut self) -> &mut Self {
        self.config.order_by = None;
        self
    }

    /// Set the filter condition
    pub fn set_condition(&mut self, condition: Condition) -> &mut Self {
        self.config.condition = Some(condition);
        self
    }

    /// Remove the filter condition
    pub fn clear_condition(&mut self) -> &mut Self {
        self.config.condition = None;
        self
    }

    /// Project only these columns
    pub fn set_attributes<I, S>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Go back to projecting every column
    pub fn clear_attributes(&mut self) -> &mut Self {
        self.config.attributes = None;
        self
    }

    /// Set the related-model inclusions
    pub fn set_associations(&mut self, associations: Vec<Include>) -> &mut Self {
        self.config.associations = associations;
        self
    }

    /// Set the function applied to each fetch result before the envelope is derived
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// paging.set_data_transform_fn(|mut result: FetchResult<Value>| {
    ///     for row in &mut result.rows {
    ///         row["transformed"] = Value::Bool(true);
    ///     }
    ///     Ok(result)
    /// });
    /// ```
    pub fn set_data_transform_fn<F>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(FetchResult<R>) -> Result<FetchResult<R>, TransformError> + Send + Sync + 'static,
    {
        self.config.transform = Some(Box::new(transform));
        self
    }

    /// Remove the transform function
    pub fn clear_data_transform_fn(&mut self) -> &mut Self {
        self.config.transform = None;
        self
    }

    // ------------------------------------------------------------------
    // JSON setters
    // ------------------------------------------------------------------

    /// Set the page from a JSON value
    ///
    /// Accepts a non-negative integer. `0`, `null` and `false` keep the
    /// current page.
    pub fn set_page_value(&mut self, value: &Value) -> Result<&mut Self, ConfigurationTypeError> {
        match count_from_value("page", value)? {
            Some(page) => Ok(self.set_page(page)),
            None => Ok(self),
        }
    }

    /// Set the page size from a JSON value, with the same rules as
    /// [`set_page_value`](Self::set_page_value)
    pub fn set_size_value(&mut self, value: &Value) -> Result<&mut Self, ConfigurationTypeError> {
        match count_from_value("size", value)? {
            Some(size) => Ok(self.set_size(size)),
            None => Ok(self),
        }
    }

    /// Set the ordering from a JSON array of `[column, direction]` pairs
    ///
    /// Missing directions default to `ASC` in the stored copy; `value` itself
    /// is never modified.
    pub fn set_order_by_value(&mut self, value: &Value) -> Result<&mut Self, ConfigurationTypeError> {
        let order_by = OrderSpec::from_value(value)?;
        Ok(self.set_order_by(order_by))
    }

    /// Set the filter condition from a JSON object
    pub fn set_condition_value(&mut self, value: &Value) -> Result<&mut Self, ConfigurationTypeError> {
        let condition = Condition::from_value(value)?;
        Ok(self.set_condition(condition))
    }

    /// Set the projected columns from a JSON array of names
    pub fn set_attributes_value(&mut self, value: &Value) -> Result<&mut Self, ConfigurationTypeError> {
        let attributes = attributes_from_value(value)?;
        Ok(self.set_attributes(attributes))
    }

    /// Set the inclusions from a JSON array of include objects or nested arrays
    pub fn set_associations_value(
        &mut self,
        value: &Value,
    ) -> Result<&mut Self, ConfigurationTypeError> {
        let associations = Include::list_from_value(value)?;
        Ok(self.set_associations(associations))
    }

    /// Apply a JSON options document
    ///
    /// Recognized keys are `page`, `size`, `order`, `where`, `attributes` and
    /// `include`; unknown keys are ignored. Every present key is validated
    /// before anything is changed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// paging.configure(&json!({
    ///     "page": 2,
    ///     "size": 10,
    ///     "where": {"status": "open"},
    ///     "order": [["created_at", "DESC"]],
    /// }))?;
    /// ```
    pub fn configure(&mut self, options: &Value) -> Result<&mut Self, ConfigurationTypeError> {
        let options = options
            .as_object()
            .ok_or_else(|| ConfigurationTypeError::new("options", "an object of paging options"))?;
        let field = |key: &str| options.get(key).filter(|v| !v.is_null());

        let page = field("page").map(|v| count_from_value("page", v)).transpose()?.flatten();
        let size = field("size").map(|v| count_from_value("size", v)).transpose()?.flatten();
        let order_by = field("order").map(OrderSpec::from_value).transpose()?;
        let condition = field("where").map(Condition::from_value).transpose()?;
        let attributes = field("attributes").map(attributes_from_value).transpose()?;
        let associations = field("include").map(Include::list_from_value).transpose()?;

        if let Some(page) = page {
            self.set_page(page);
        }
        if let Some(size) = size {
            self.set_size(size);
        }
        if let Some(order_by) = order_by {
            self.set_order_by(order_by);
        }
        if let Some(condition) = condition {
            self.set_condition(condition);
        }
        if let Some(attributes) = attributes {
            self.set_attributes(attributes);
        }
        if let Some(associations) = associations {
            self.set_associations(associations);
        }
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Limit and offset for the current page
    pub fn compute_limit_offset(&self) -> Pagination {
        Pagination::page(self.page(), self.size())
    }

    /// The options record handed to the collaborator
    pub fn find_options(&self) -> FindOptions {
        let Pagination { limit, offset } = self.compute_limit_offset();
        FindOptions {
            where_clause: self.config.condition.clone(),
            attributes: Projection::from(self.config.attributes.clone()),
            limit,
            offset,
            order: self.config.order_by.clone(),
            include: self.config.associations.clone(),
        }
    }

    /// Build the envelope for a fetch result using the current page and size
    pub fn derive_envelope(&self, result: FetchResult<R>) -> Result<PagingEnvelope<R>, PagingError> {
        PagingEnvelope::derive(result, self.page(), self.size())
    }

    /// Fetch the current page and wrap it in a [`PagingEnvelope`]
    ///
    /// Makes exactly one collaborator call. Collaborator and transform errors
    /// are logged and returned unchanged; nothing is retried.
    pub async fn execute(&self) -> Result<PagingEnvelope<R>, PagingError> {
        let span = tracing::debug_span!("paging_execute", page = self.page(), size = self.size());

        self.fetch_page()
            .instrument(span)
            .await
            .inspect_err(|e| tracing::error!("Pagination execution error: {}", e))
    }

    async fn fetch_page(&self) -> Result<PagingEnvelope<R>, PagingError> {
        let options = self.find_options();
        tracing::debug!(
            limit = options.limit,
            offset = options.offset,
            "Delegating find_and_count_all"
        );

        let fetched = self.model.find_and_count_all(&options).await?;
        let fetched = match &self.config.transform {
            Some(transform) => transform(fetched)?,
            None => fetched,
        };

        self.derive_envelope(fetched)
    }
}

impl<R, M: fmt::Debug> fmt::Debug for PagingBuilder<R, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagingBuilder")
            .field("model", &self.model)
            .field("config", &self.config)
            .field("default_size", &self.default_size)
            .field("max_size", &self.max_size)
            .finish()
    }
}

/// Read a page or size from JSON; `None` means "keep the current value"
fn count_from_value(
    option: &'static str,
    value: &Value,
) -> Result<Option<u64>, ConfigurationTypeError> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(|n| (n > 0).then_some(n))
            .ok_or_else(|| ConfigurationTypeError::new(option, "a non-negative integer")),
        _ => Err(ConfigurationTypeError::new(option, "a number")),
    }
}
