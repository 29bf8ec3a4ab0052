//! Book Catalog Error Hierarchy
//!
//! Defines the error types surfaced by the catalog service, categorized by
//! layer: input validation, business rules, storage, and configuration.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client-submitted payload failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisted collection could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A create would duplicate another record's ISBN
    #[error("ISBN must be unique")]
    DuplicateIsbn,

    /// Delete target does not exist
    #[error("Book not found")]
    BookNotFound,

    /// Invalid service configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required text field is empty or whitespace-only
    #[error("Field '{field}' must not be empty")]
    FieldRequired { field: &'static str },

    /// Publication year outside [1450, current year]
    #[error("Publication year should be between 1450 and present year.")]
    YearOutOfRange { year: i32 },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Disk I/O failures while reading or writing the collection file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Persisted collection exists but does not parse
    #[error("Book data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
