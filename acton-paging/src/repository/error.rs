//! Collaborator error types
//!
//! Errors raised by a [`FindAndCount`](super::FindAndCount) implementation.
//! The paging executor logs them and hands them back to the caller untouched.
//!
//! # Example
//!
//! ```rust
//! use acton_paging::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::unknown_model("Widget");
//! assert_eq!(error.kind, RepositoryErrorKind::UnknownModel);
//! assert_eq!(error.model.as_deref(), Some("Widget"));
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Fetching a page of rows together with the total count
    FindAndCountAll,
    /// Applying the where-clause
    Filter,
    /// Resolving included associations
    Include,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindAndCountAll => write!(f, "find_and_count_all"),
            Self::Filter => write!(f, "filter"),
            Self::Include => write!(f, "include"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// The referenced model is not registered with the collaborator
    UnknownModel,
    /// The options could not be turned into a query
    InvalidQuery,
    /// Failed to connect to the data source
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Underlying database error
    DatabaseError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModel => write!(f, "unknown_model"),
            Self::InvalidQuery => write!(f, "invalid_query"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
///
/// # Example
///
/// ```rust
/// use acton_paging::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
///
/// let error = RepositoryError::new(
///     RepositoryOperation::FindAndCountAll,
///     RepositoryErrorKind::ConnectionFailed,
///     "connection refused",
/// )
/// .with_model("Task");
///
/// assert_eq!(
///     error.to_string(),
///     "Repository connection_failed error during find_and_count_all: connection refused [model: Task]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The model involved, when known
    pub model: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            model: None,
        }
    }

    /// Create an "unknown model" error
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::FindAndCountAll,
            kind: RepositoryErrorKind::UnknownModel,
            message: "Model is not defined".to_string(),
            model: Some(model.into()),
        }
    }

    /// Create an "invalid query" error
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_paging::repository::{RepositoryError, RepositoryOperation};
    ///
    /// let error = RepositoryError::invalid_query(
    ///     RepositoryOperation::Filter,
    ///     "unsupported operator `$between`",
    /// );
    /// assert!(!error.is_retriable());
    /// ```
    pub fn invalid_query(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::InvalidQuery, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::FindAndCountAll,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a timeout error
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a database error
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Attach the model name to an existing error
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Check if this error is transient
    ///
    /// Retrying is left to the caller; the paging executor never retries.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref model) = self.model {
            write!(f, " [model: {}]", model)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
