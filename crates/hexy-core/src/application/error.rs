//! Application layer errors.
//!
//! These are runtime failures of user code running under the container
//! (factories, hooks, handlers) and infrastructure failures (poisoned locks,
//! module sources). Wiring defects are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::domain::{HookFailure, Token};
use crate::error::ErrorCategory;

/// Errors that occur while running providers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A factory returned an error.
    #[error("Failed to instantiate '{token}': {reason}")]
    InstantiationFailed { token: Token, reason: String },

    /// The resolved instance is not of the requested type.
    #[error("Service '{token}' is not a {expected}")]
    TypeMismatch { token: Token, expected: &'static str },

    /// An init hook returned an error; the instance was discarded.
    #[error("Init hook of '{token}' failed: {reason}")]
    InitHookFailed { token: Token, reason: String },

    /// One or more destroy hooks failed. Every hook was still attempted.
    #[error("{} destroy hook(s) failed: {}", .failures.len(), render_failures(.failures))]
    Teardown { failures: Vec<HookFailure> },

    /// The orchestrator has no handler for a request type.
    #[error("No handler registered for request type: {request_type}")]
    NoHandlerRegistered { request_type: String },

    /// A request handler returned an error.
    #[error("Handler for '{request_type}' failed: {reason}")]
    HandlerFailed { request_type: String, reason: String },

    /// Internal lock poisoned by a panicking factory or hook.
    #[error("Container state lock poisoned: {resource}")]
    LockPoisoned { resource: &'static str },

    /// A module source could not produce its modules.
    #[error("Module source failed: {reason}")]
    ModuleSourceFailed { reason: String },
}

fn render_failures(failures: &[HookFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InstantiationFailed { token, .. } => vec![
                format!("The factory for '{}' returned an error", token),
                "Check the factory's own preconditions (configuration, connections)".into(),
            ],
            Self::TypeMismatch { token, expected } => vec![
                format!("'{}' resolves to a different type than {}", token, expected),
                "Check which provider is registered under that token".into(),
            ],
            Self::Teardown { failures } => {
                let mut out = vec!["All destroy hooks were attempted; these failed:".into()];
                out.extend(failures.iter().map(|f| format!("  • {f}")));
                out
            }
            Self::NoHandlerRegistered { request_type } => vec![
                format!("Register a handler for '{}'", request_type),
                "Use Orchestrator::register_handler".into(),
            ],
            Self::ModuleSourceFailed { .. } => vec![
                "Check the module manifest path and its syntax".into(),
                "Try: hexy check <MANIFEST> -v".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TypeMismatch { .. } => ErrorCategory::Wiring,
            Self::NoHandlerRegistered { .. } => ErrorCategory::NotFound,
            Self::ModuleSourceFailed { .. } => ErrorCategory::Configuration,
            Self::LockPoisoned { .. } => ErrorCategory::Internal,
            Self::InstantiationFailed { .. }
            | Self::InitHookFailed { .. }
            | Self::Teardown { .. }
            | Self::HandlerFailed { .. } => ErrorCategory::Runtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_message_lists_every_failure() {
        let err = ApplicationError::Teardown {
            failures: vec![
                HookFailure {
                    token: "db".into(),
                    reason: "connection reset".into(),
                },
                HookFailure {
                    token: "cache".into(),
                    reason: "flush failed".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 destroy hook(s) failed"));
        assert!(msg.contains("db: connection reset"));
        assert!(msg.contains("cache: flush failed"));
        assert_eq!(err.category(), ErrorCategory::Runtime);
    }

    #[test]
    fn missing_handler_is_not_found() {
        let err = ApplicationError::NoHandlerRegistered {
            request_type: "create-user".into(),
        };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.suggestions()[0].contains("create-user"));
    }
}
