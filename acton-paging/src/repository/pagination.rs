//! Limit/offset, ordering and filter-operator primitives
//!
//! These are the vocabulary shared between the paging builder and any
//! [`FindAndCount`](super::FindAndCount) collaborator.
//!
//! # Example
//!
//! ```rust
//! use acton_paging::repository::{FilterOperator, OrderDirection, Pagination};
//!
//! let pagination = Pagination::page(3, 5);
//! assert_eq!(pagination.limit, 5);
//! assert_eq!(pagination.offset, 10);
//!
//! assert_eq!(OrderDirection::Descending.to_string(), "DESC");
//! assert_eq!(FilterOperator::from_key("$gte"), Some(FilterOperator::GreaterThanOrEqual));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Page size used when none has been configured
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Direction for ordering results
///
/// Serialized as `"ASC"` / `"DESC"`, the spelling ORM order clauses use.
///
/// # Example
///
/// ```rust
/// use acton_paging::repository::OrderDirection;
///
/// let desc: OrderDirection = "DESC".parse().unwrap();
/// assert_eq!(desc, OrderDirection::Descending);
/// assert!("desc".parse::<OrderDirection>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    #[serde(rename = "ASC")]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    #[serde(rename = "DESC")]
    Descending,
}

impl OrderDirection {
    /// Keyword used in order clauses
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a direction keyword is not exactly `ASC` or `DESC`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid order direction `{0}`, expected \"ASC\" or \"DESC\"")]
pub struct ParseDirectionError(pub String);

impl FromStr for OrderDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(Self::Ascending),
            "DESC" => Ok(Self::Descending),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Limit/offset pair handed to the collaborator
///
/// # Example
///
/// ```rust
/// use acton_paging::repository::Pagination;
///
/// let first = Pagination::page(1, 20);
/// assert_eq!(first.offset, 0);
///
/// let explicit = Pagination::new(40, 20); // Skip 40, take 20
/// assert_eq!(explicit.limit, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    /// Create new pagination parameters
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Create pagination for a specific page number (1-indexed)
    ///
    /// Page 0 is treated as page 1 and the offset saturates instead of
    /// overflowing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paging::repository::Pagination;
    ///
    /// let page3 = Pagination::page(3, 20);
    /// assert_eq!(page3.offset, 40);
    /// assert_eq!(page3.limit, 20);
    /// ```
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);
        Self {
            offset,
            limit: page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(1, DEFAULT_PAGE_SIZE)
    }
}

/// Comparison operators understood inside a condition
///
/// Conditions follow the ORM convention of operator objects keyed by `$name`,
/// e.g. `{"age": {"$gte": 18}}`. A bare value means [`FilterOperator::Equal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Not equal to (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
    /// Pattern matching with `%` and `_` wildcards (LIKE)
    Like,
    /// Value is in a list (IN)
    In,
    /// Identity comparison, used for `null` checks (IS)
    Is,
}

impl FilterOperator {
    /// All operators, in declaration order
    pub const ALL: [Self; 9] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::Like,
        Self::In,
        Self::Is,
    ];

    /// Key used for this operator inside a condition object
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Equal => "$eq",
            Self::NotEqual => "$ne",
            Self::GreaterThan => "$gt",
            Self::GreaterThanOrEqual => "$gte",
            Self::LessThan => "$lt",
            Self::LessThanOrEqual => "$lte",
            Self::Like => "$like",
            Self::In => "$in",
            Self::Is => "$is",
        }
    }

    /// Look an operator up by its condition key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.key() == key)
    }
}
