//! Filter conditions
//!
//! A [`Condition`] is an opaque mapping of field constraints handed verbatim
//! to the collaborator. Bare values mean equality; operator objects follow the
//! `$name` convention of [`FilterOperator`].
//!
//! # Example
//!
//! ```rust
//! use acton_paging::paging::Condition;
//! use acton_paging::repository::FilterOperator;
//! use serde_json::json;
//!
//! let condition = Condition::eq("status", "active")
//!     .with_op("age", FilterOperator::GreaterThanOrEqual, 18);
//!
//! assert_eq!(
//!     serde_json::to_value(&condition).unwrap(),
//!     json!({"status": "active", "age": {"$gte": 18}})
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ConfigurationTypeError;
use crate::repository::FilterOperator;

const OPTION: &str = "where";

/// Field constraints for the collaborator's where-clause
///
/// An empty condition is passed through as-is; most collaborators treat it as
/// "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(Map<String, Value>);

impl Condition {
    /// Create an empty condition
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an equality condition on a single field
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().with(field, value)
    }

    /// Add (or replace) an equality constraint
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Add an operator constraint, merging with operators already set on the field
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paging::paging::Condition;
    /// use acton_paging::repository::FilterOperator;
    /// use serde_json::json;
    ///
    /// let condition = Condition::new()
    ///     .with_op("age", FilterOperator::GreaterThanOrEqual, 18)
    ///     .with_op("age", FilterOperator::LessThan, 65);
    /// assert_eq!(condition.get("age"), Some(&json!({"$gte": 18, "$lt": 65})));
    /// ```
    #[must_use]
    pub fn with_op(
        mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        let entry = self
            .0
            .entry(field.into())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(ops) => {
                ops.insert(operator.key().to_string(), value.into());
            }
            other => {
                let mut ops = Map::new();
                ops.insert(FilterOperator::Equal.key().to_string(), other.take());
                ops.insert(operator.key().to_string(), value.into());
                *other = Value::Object(ops);
            }
        }
        self
    }

    /// Validate and copy a JSON value into a condition
    ///
    /// Only JSON objects are accepted.
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationTypeError> {
        match value {
            Value::Object(map) => Ok(Self(map.clone())),
            _ => Err(ConfigurationTypeError::new(
                OPTION,
                "an object of field constraints",
            )),
        }
    }

    /// Constraint set on a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Iterate over `(field, constraint)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of constrained fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is constrained
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying mapping
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Condition {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<&Value> for Condition {
    type Error = ConfigurationTypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
