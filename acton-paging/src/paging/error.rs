//! Paging error types

use std::error::Error as StdError;

use thiserror::Error;

use crate::repository::RepositoryError;

/// A setter received a value of the wrong shape
///
/// Raised synchronously; the builder is left exactly as it was.
///
/// # Example
///
/// ```rust
/// use acton_paging::paging::ConfigurationTypeError;
///
/// let error = ConfigurationTypeError::new("where", "an object of field constraints");
/// assert_eq!(
///     error.to_string(),
///     "invalid `where` option: expected an object of field constraints"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{option}` option: expected {expected}")]
pub struct ConfigurationTypeError {
    /// The option being configured (`page`, `size`, `order`, `where`, `attributes`, `include`)
    pub option: &'static str,
    /// Description of the accepted shape
    pub expected: String,
}

impl ConfigurationTypeError {
    /// Create a new configuration type error
    pub fn new(option: &'static str, expected: impl Into<String>) -> Self {
        Self {
            option,
            expected: expected.into(),
        }
    }
}

/// Error raised by a caller-supplied transform function
///
/// # Example
///
/// ```rust
/// use acton_paging::paging::TransformError;
///
/// let error = TransformError::new("row 3 has no name");
/// assert_eq!(error.to_string(), "row 3 has no name");
/// ```
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransformError(Box<dyn StdError + Send + Sync>);

impl TransformError {
    /// Wrap any error (or message) raised while transforming a fetch result
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(source.into())
    }

    /// Borrow the underlying error
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Take the underlying error
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}

/// Errors surfaced by [`PagingBuilder::execute`](super::PagingBuilder::execute)
/// and [`PagingBuilder::configure`](super::PagingBuilder::configure)
#[derive(Debug, Error)]
pub enum PagingError {
    /// An options document failed shape validation
    #[error(transparent)]
    Configuration(#[from] ConfigurationTypeError),

    /// The collaborator failed; the error is passed through as-is
    #[error(transparent)]
    Fetch(#[from] RepositoryError),

    /// The transform function failed; the error is passed through as-is
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Envelope derivation saw a zero page size
    #[error("page size must be positive when deriving the paging envelope")]
    InvalidPageSize,
}

impl PagingError {
    /// The collaborator error, if this is a fetch failure
    pub fn as_fetch(&self) -> Option<&RepositoryError> {
        match self {
            Self::Fetch(e) => Some(e),
            _ => None,
        }
    }
}
