// ============================================================================
// domain/error.rs - WIRING DEFECTS
// ============================================================================

use thiserror::Error;

use crate::domain::token::{Token, render_path};

/// Root domain error type.
///
/// Every variant is a programmer error: a wiring defect that has to be fixed
/// in code. None of them is retried, and none of them is wrapped as it
/// propagates out of a nested resolution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Resolution
    // ========================================================================
    #[error("Service not found: {token}")]
    ServiceNotFound { token: Token },

    #[error("Circular dependency detected: {}", render_path(.path))]
    CircularDependency { path: Vec<Token> },

    #[error("Request-scoped service '{token}' needs a resolution context but none was supplied")]
    MissingScopeContext { token: Token },

    // ========================================================================
    // Registration
    // ========================================================================
    #[error("Duplicate registration for token: {token}")]
    DuplicateRegistration { token: Token },

    #[error("No descriptor available for '{token}'")]
    MissingDescriptor { token: Token },

    #[error("Invalid scope '{0}': expected singleton, transient or request")]
    InvalidScope(String),

    // ========================================================================
    // Composition
    // ========================================================================
    #[error("Circular module import detected: {}", .path.join(" -> "))]
    CircularModuleImport { path: Vec<String> },

    #[error(
        "Provider '{provider}' in module '{module}' depends on '{token}', which is not visible to that module"
    )]
    UnresolvedDependency {
        module: String,
        provider: Token,
        token: Token,
    },

    #[error("Module '{module}' imports unknown module '{import}'")]
    ModuleNotFound { module: String, import: String },

    #[error("Module '{name}' is defined more than once")]
    DuplicateModule { name: String },

    #[error("Module '{module}' exports '{token}', which it neither provides nor imports")]
    InvalidExport { module: String, token: Token },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ServiceNotFound { token } => vec![
                format!("Nothing is registered under '{}'", token),
                "Register a provider for it, or add its module to the composition".into(),
            ],
            Self::CircularDependency { path } => vec![
                format!("Dependency cycle: {}", render_path(path)),
                "Break the cycle by extracting the shared logic into a third provider".into(),
            ],
            Self::MissingScopeContext { token } => vec![
                format!("'{}' is request-scoped", token),
                "Resolve it with Container::resolve_in and a ResolutionContext".into(),
                "A singleton must not depend on a request-scoped provider".into(),
            ],
            Self::DuplicateRegistration { token } => vec![
                format!("'{}' was registered twice", token),
                "Remove one of the registrations".into(),
                "Or use register_or_replace / allow_overwrite to replace it deliberately".into(),
            ],
            Self::UnresolvedDependency { module, token, .. } => vec![
                format!("Module '{}' cannot see '{}'", module, token),
                "Import the module that provides it".into(),
                "Make sure that module lists it under exports".into(),
            ],
            Self::CircularModuleImport { path } => vec![
                format!("Import cycle: {}", path.join(" -> ")),
                "Move the shared providers into a module both sides can import".into(),
            ],
            Self::ModuleNotFound { import, .. } => vec![
                format!("No module named '{}' was supplied to the composer", import),
                "Check the spelling of the import".into(),
            ],
            Self::InvalidExport { module, token } => vec![
                format!("'{}' is not provided by or visible to '{}'", token, module),
                "Only own providers or imported exports can be re-exported".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ServiceNotFound { .. } | Self::ModuleNotFound { .. } => ErrorCategory::NotFound,
            Self::CircularDependency { .. }
            | Self::MissingScopeContext { .. }
            | Self::CircularModuleImport { .. }
            | Self::UnresolvedDependency { .. } => ErrorCategory::Wiring,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Wiring,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_dependency_message_names_the_cycle() {
        let err = DomainError::CircularDependency {
            path: vec!["A".into(), "B".into(), "C".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> C -> A");
        assert_eq!(err.category(), ErrorCategory::Wiring);
    }

    #[test]
    fn circular_import_message_names_the_cycle() {
        let err = DomainError::CircularModuleImport {
            path: vec!["m1".into(), "m2".into(), "m1".into()],
        };
        assert!(err.to_string().ends_with("m1 -> m2 -> m1"));
    }

    #[test]
    fn unresolved_dependency_suggests_import() {
        let err = DomainError::UnresolvedDependency {
            module: "infra".into(),
            provider: "repo".into(),
            token: "helper".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("Import")));
    }

    #[test]
    fn not_found_category() {
        let err = DomainError::ServiceNotFound { token: "x".into() };
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
