//! Custom error types for Hearth
//!
//! This module defines the error hierarchy for the library using thiserror.
//! Every error renders a human-readable message through `Display` and exposes
//! a machine-distinguishable [`ErrorKind`] so a presentation layer can decide
//! between "show error" and "allow retry".

use std::fmt;

use thiserror::Error;

/// The main error type for Hearth operations
#[derive(Error, Debug)]
pub enum HearthError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist in the store
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// An operation requires a precondition the caller has not met
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A multi-step operation failed after committing some of its steps.
    /// Nothing is rolled back.
    #[error("Partial failure during {operation}: {completed} of {total} steps committed: {source}")]
    PartialFailure {
        operation: &'static str,
        completed: usize,
        total: usize,
        #[source]
        source: Box<HearthError>,
    },

    /// Progress computed against an allocation of zero
    #[error("Cannot compute progress for '{category}': allocated amount is zero")]
    DivisionHazard { category: String },

    /// Document store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

/// Machine-readable classification of a [`HearthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Io,
    Json,
    Validation,
    NotFound,
    Duplicate,
    InvalidState,
    PartialFailure,
    DivisionHazard,
    Storage,
    Auth,
    Export,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::Io => "io",
            Self::Json => "json",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
            Self::InvalidState => "invalid_state",
            Self::PartialFailure => "partial_failure",
            Self::DivisionHazard => "division_hazard",
            Self::Storage => "storage",
            Self::Auth => "auth",
            Self::Export => "export",
        };
        write!(f, "{}", name)
    }
}

impl HearthError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Wrap a failed step of a multi-step operation
    pub fn partial(
        operation: &'static str,
        completed: usize,
        total: usize,
        source: HearthError,
    ) -> Self {
        Self::PartialFailure {
            operation,
            completed,
            total,
            source: Box::new(source),
        }
    }

    /// The machine-distinguishable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::PartialFailure { .. } => ErrorKind::PartialFailure,
            Self::DivisionHazard { .. } => ErrorKind::DivisionHazard,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Export(_) => ErrorKind::Export,
        }
    }

    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// The library never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PartialFailure { .. } | Self::Storage(_) | Self::Io(_)
        )
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for HearthError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for HearthError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for Hearth operations
pub type HearthResult<T> = Result<T, HearthError>;
