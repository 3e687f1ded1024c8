//! Column projection

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ConfigurationTypeError;

const OPTION: &str = "attributes";

/// Which columns the collaborator should return
///
/// Serializes the way ORM attribute options do: a bare array for
/// [`Projection::Only`], `{"exclude": [...]}` for [`Projection::All`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Projection {
    /// Exactly these columns, in this order
    Only(Vec<String>),
    /// Every column except the excluded ones
    All {
        /// Columns to leave out
        exclude: Vec<String>,
    },
}

impl Projection {
    /// Every column, nothing excluded
    #[must_use]
    pub fn all() -> Self {
        Self::All {
            exclude: Vec::new(),
        }
    }

    /// Whether a column survives this projection
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paging::paging::Projection;
    ///
    /// let only = Projection::Only(vec!["id".into(), "name".into()]);
    /// assert!(only.includes("name"));
    /// assert!(!only.includes("secret"));
    ///
    /// let all = Projection::All { exclude: vec!["secret".into()] };
    /// assert!(all.includes("name"));
    /// assert!(!all.includes("secret"));
    /// ```
    pub fn includes(&self, column: &str) -> bool {
        match self {
            Self::Only(columns) => columns.iter().any(|c| c == column),
            Self::All { exclude } => !exclude.iter().any(|c| c == column),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Option<Vec<String>>> for Projection {
    fn from(attributes: Option<Vec<String>>) -> Self {
        attributes.map_or_else(Self::all, Self::Only)
    }
}

/// Validate a JSON value as an ordered list of column names
pub fn attributes_from_value(value: &Value) -> Result<Vec<String>, ConfigurationTypeError> {
    let invalid = || ConfigurationTypeError::new(OPTION, "an array of column names");

    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|column| column.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}
