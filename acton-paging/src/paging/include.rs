//! Related-model inclusion specifications
//!
//! An inclusion is either a single related model ([`Include::Leaf`]) or an
//! ordered group of further inclusions ([`Include::Group`]). Leaves can carry
//! their own nested inclusions.
//!
//! # Example
//!
//! ```rust
//! use acton_paging::paging::{Include, IncludeSpec};
//! use serde_json::json;
//!
//! let parsed = Include::list_from_value(&json!([
//!     {"model": "Task", "as": "tasks", "attributes": ["name"]},
//!     [{"model": "Owner"}],
//! ]))
//! .unwrap();
//!
//! assert_eq!(
//!     parsed,
//!     vec![
//!         Include::Leaf(IncludeSpec::new("Task").alias("tasks").attributes(["name"])),
//!         Include::Group(vec![Include::model("Owner")]),
//!     ]
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::attributes::attributes_from_value;
use super::error::ConfigurationTypeError;

const OPTION: &str = "include";
const EXPECTED: &str = "an array of include objects or nested arrays of include objects";

/// One related model to join into each row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeSpec {
    /// Name of the related model
    pub model: String,
    /// Key the related rows are attached under
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Columns of the related model to keep, `None` keeping all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    /// Drop parent rows that have no related row
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Inclusions nested under this model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<Include>,
}

impl IncludeSpec {
    /// Include a related model with default options
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            alias: None,
            attributes: None,
            required: false,
            include: Vec::new(),
        }
    }

    /// Attach related rows under this key
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Keep only these columns of the related model
    #[must_use]
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Drop parent rows without a related row
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Nest further inclusions under this model
    #[must_use]
    pub fn include(mut self, include: Include) -> Self {
        self.include.push(include);
        self
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self, ConfigurationTypeError> {
        let model = object
            .get("model")
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigurationTypeError::new(OPTION, "a `model` name on every include object"))?;

        let alias = match object.get("as") {
            None | Some(Value::Null) => None,
            Some(Value::String(alias)) => Some(alias.clone()),
            Some(_) => {
                return Err(ConfigurationTypeError::new(OPTION, "`as` to be a string"));
            }
        };

        let attributes = match object.get("attributes") {
            None | Some(Value::Null) => None,
            Some(value) => Some(attributes_from_value(value).map_err(|_| {
                ConfigurationTypeError::new(OPTION, "`attributes` to be an array of column names")
            })?),
        };

        let required = match object.get("required") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(required)) => *required,
            Some(_) => {
                return Err(ConfigurationTypeError::new(OPTION, "`required` to be a boolean"));
            }
        };

        let include = match object.get("include") {
            None | Some(Value::Null) => Vec::new(),
            Some(nested) => Include::list_from_value(nested)?,
        };

        Ok(Self {
            model: model.to_string(),
            alias,
            attributes,
            required,
            include,
        })
    }
}

/// An inclusion: one related model, or a nested group of inclusions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Include {
    /// A single related model
    Leaf(IncludeSpec),
    /// An ordered group of inclusions
    Group(Vec<Include>),
}

impl Include {
    /// Shorthand for a leaf with default options
    pub fn model(model: impl Into<String>) -> Self {
        Self::Leaf(IncludeSpec::new(model))
    }

    /// Validate a JSON value as a list of inclusions
    ///
    /// Every element must be a non-array object or, recursively, another such
    /// array.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>, ConfigurationTypeError> {
        value
            .as_array()
            .ok_or_else(|| ConfigurationTypeError::new(OPTION, EXPECTED))?
            .iter()
            .map(Self::from_value)
            .collect()
    }

    fn from_value(value: &Value) -> Result<Self, ConfigurationTypeError> {
        match value {
            Value::Object(object) => IncludeSpec::from_object(object).map(Self::Leaf),
            Value::Array(_) => Self::list_from_value(value).map(Self::Group),
            _ => Err(ConfigurationTypeError::new(OPTION, EXPECTED)),
        }
    }

    /// Every leaf reachable through groups, in document order
    ///
    /// Inclusions nested inside a leaf belong to that leaf and are not
    /// returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paging::paging::Include;
    ///
    /// let include = Include::Group(vec![
    ///     Include::model("A"),
    ///     Include::Group(vec![Include::model("B")]),
    /// ]);
    /// let names: Vec<_> = include.leaves().iter().map(|spec| spec.model.as_str()).collect();
    /// assert_eq!(names, ["A", "B"]);
    /// ```
    pub fn leaves(&self) -> Vec<&IncludeSpec> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a IncludeSpec>) {
        match self {
            Self::Leaf(spec) => out.push(spec),
            Self::Group(items) => items.iter().for_each(|item| item.collect_leaves(out)),
        }
    }
}

impl From<IncludeSpec> for Include {
    fn from(spec: IncludeSpec) -> Self {
        Self::Leaf(spec)
    }
}

/// Every leaf of a list of inclusions, in document order
pub fn leaves(includes: &[Include]) -> Vec<&IncludeSpec> {
    let mut out = Vec::new();
    for include in includes {
        include.collect_leaves(&mut out);
    }
    out
}
