//! Crate-level error types
//!
//! Paging operations report [`PagingError`](crate::paging::PagingError); this
//! module covers loading settings and installing the tracing subscriber.

use thiserror::Error;

/// Result type alias for settings and setup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settings and setup errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Configuration parsed but holds values no builder can honour
    #[error("Invalid paging settings: {0}")]
    InvalidSettings(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
