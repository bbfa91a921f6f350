//! Provider lifetimes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Lifetime policy for a provider's instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One instance per container, created lazily and cached.
    #[default]
    Singleton,
    /// A new instance on every resolution.
    Transient,
    /// One instance per [`ResolutionContext`](crate::domain::ResolutionContext).
    #[serde(alias = "scoped")]
    Request,
}

impl Scope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Transient => "transient",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "transient" => Ok(Self::Transient),
            "request" | "scoped" => Ok(Self::Request),
            other => Err(DomainError::InvalidScope(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_singleton() {
        assert_eq!(Scope::default(), Scope::Singleton);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("SINGLETON".parse::<Scope>().unwrap(), Scope::Singleton);
        assert_eq!("Transient".parse::<Scope>().unwrap(), Scope::Transient);
        assert_eq!("scoped".parse::<Scope>().unwrap(), Scope::Request);
        assert!(matches!(
            "prototype".parse::<Scope>(),
            Err(DomainError::InvalidScope(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        for scope in [Scope::Singleton, Scope::Transient, Scope::Request] {
            assert_eq!(scope.to_string().parse::<Scope>().unwrap(), scope);
        }
    }
}
