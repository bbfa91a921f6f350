//! Unified error handling for Hexy Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with a display category and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Hexy Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HexyError {
    /// Wiring defects (missing providers, cycles, visibility violations).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Runtime failures of factories, hooks and handlers.
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl HexyError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in Hexy".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Wiring => ErrorCategory::Wiring,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Whether this error is a wiring defect that has to be fixed in code.
    pub fn is_wiring_defect(&self) -> bool {
        matches!(self, Self::Domain(_))
    }

    /// The domain error inside, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }

    /// The application error inside, if any.
    pub fn as_application(&self) -> Option<&ApplicationError> {
        match self {
            Self::Application(e) => Some(e),
            _ => None,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Wiring,
    Runtime,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type HexyResult<T> = Result<T, HexyError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> HexyResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> HexyResult<T> {
        self.map_err(|e| HexyError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Token;

    #[test]
    fn domain_errors_are_wiring_defects() {
        let err: HexyError = DomainError::ServiceNotFound {
            token: Token::named("x"),
        }
        .into();
        assert!(err.is_wiring_defect());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_string(), "Service not found: x");
    }

    #[test]
    fn context_wraps_foreign_errors_as_internal() {
        let result: Result<(), std::fmt::Error> = Err(std::fmt::Error);
        let err = result.context("rendering graph").unwrap_err();
        assert!(matches!(err, HexyError::Internal { .. }));
        assert!(err.to_string().contains("rendering graph"));
    }
}
