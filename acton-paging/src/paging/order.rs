//! Ordering specifications
//!
//! An [`OrderSpec`] is an ordered list of `(column, direction)` pairs. When
//! built from JSON, the caller's value is only read: a fresh, normalized spec
//! is materialized with missing directions defaulted to `ASC`.
//!
//! # Example
//!
//! ```rust
//! use acton_paging::paging::OrderSpec;
//! use acton_paging::repository::OrderDirection;
//! use serde_json::json;
//!
//! let input = json!([["name", "DESC"], ["id"]]);
//! let spec = OrderSpec::from_value(&input).unwrap();
//!
//! assert_eq!(spec.items()[1].direction, OrderDirection::Ascending);
//! assert_eq!(input, json!([["name", "DESC"], ["id"]]));
//! ```

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

use super::error::ConfigurationTypeError;
use crate::repository::OrderDirection;

const OPTION: &str = "order";
const EXPECTED: &str = "an array of [column, direction] pairs with direction \"ASC\" or \"DESC\"";

/// One ordering term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderItem {
    /// Column to order by
    pub column: String,
    /// Sort direction
    pub direction: OrderDirection,
}

impl OrderItem {
    /// Create a new ordering term
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    fn from_value(value: &Value) -> Result<Self, ConfigurationTypeError> {
        let invalid = || ConfigurationTypeError::new(OPTION, EXPECTED);

        let pair = value.as_array().ok_or_else(invalid)?;
        let column = pair.first().and_then(Value::as_str).ok_or_else(invalid)?;
        let direction = match pair.as_slice() {
            [_] => OrderDirection::default(),
            [_, direction] => direction
                .as_str()
                .and_then(|d| d.parse::<OrderDirection>().ok())
                .ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };

        Ok(Self::new(column, direction))
    }
}

impl Serialize for OrderItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_seq(Some(2))?;
        pair.serialize_element(&self.column)?;
        pair.serialize_element(&self.direction)?;
        pair.end()
    }
}

/// Ordered list of ordering terms
///
/// Serializes as `[["column", "ASC"], ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct OrderSpec(Vec<OrderItem>);

impl OrderSpec {
    /// Create an empty spec
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a term
    #[must_use]
    pub fn by(mut self, column: impl Into<String>, direction: OrderDirection) -> Self {
        self.0.push(OrderItem::new(column, direction));
        self
    }

    /// Append an ascending term
    #[must_use]
    pub fn asc(self, column: impl Into<String>) -> Self {
        self.by(column, OrderDirection::Ascending)
    }

    /// Append a descending term
    #[must_use]
    pub fn desc(self, column: impl Into<String>) -> Self {
        self.by(column, OrderDirection::Descending)
    }

    /// Validate a JSON value and materialize a normalized spec
    ///
    /// Accepts an array whose every element is an array holding a string
    /// column name and, optionally, `"ASC"` or `"DESC"`. Pairs with a third
    /// element are rejected rather than having the extra elements ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paging::paging::OrderSpec;
    /// use serde_json::json;
    ///
    /// assert!(OrderSpec::from_value(&json!([["name", "DESC"]])).is_ok());
    /// assert!(OrderSpec::from_value(&json!(["name", "DESC"])).is_err());
    /// assert!(OrderSpec::from_value(&json!([[1, "DESC"]])).is_err());
    /// assert!(OrderSpec::from_value(&json!([["name", "UP"]])).is_err());
    /// assert!(OrderSpec::from_value(&json!([["name", "ASC", "extra"]])).is_err());
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationTypeError> {
        let items = value
            .as_array()
            .ok_or_else(|| ConfigurationTypeError::new(OPTION, EXPECTED))?;

        items
            .iter()
            .map(OrderItem::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// The terms, in priority order
    pub fn items(&self) -> &[OrderItem] {
        &self.0
    }

    /// Iterate over the terms
    pub fn iter(&self) -> std::slice::Iter<'_, OrderItem> {
        self.0.iter()
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no terms
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, OrderDirection)> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = (S, OrderDirection)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(column, direction)| OrderItem::new(column, direction))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a OrderSpec {
    type Item = &'a OrderItem;
    type IntoIter = std::slice::Iter<'a, OrderItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<&Value> for OrderSpec {
    type Error = ConfigurationTypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
