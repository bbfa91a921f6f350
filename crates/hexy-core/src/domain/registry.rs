//! Token → provider definition map.
//!
//! Pure storage: no instantiation, and dependency tokens are kept exactly as
//! declared. Checking them is the container's job at resolution time (and the
//! composer's at composition time), since under staged composition the
//! providers they point at may not be registered yet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::provider::ProviderDefinition;
use crate::domain::token::Token;

/// What `register` does when the token is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Fail with `DuplicateRegistration`.
    #[default]
    Reject,
    /// Latest registration wins.
    Replace,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: HashMap<Token, ProviderDefinition>,
    order: Vec<Token>,
    policy: RegistrationPolicy,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Store `definition` under its token, following the registry's policy.
    pub fn register(&mut self, definition: ProviderDefinition) -> Result<(), DomainError> {
        if self.policy == RegistrationPolicy::Reject && self.has(definition.token()) {
            return Err(DomainError::DuplicateRegistration {
                token: definition.token().clone(),
            });
        }
        self.register_or_replace(definition);
        Ok(())
    }

    /// Store `definition`, replacing any existing one. Returns the replaced definition.
    pub fn register_or_replace(
        &mut self,
        definition: ProviderDefinition,
    ) -> Option<ProviderDefinition> {
        let token = definition.token().clone();
        let previous = self.definitions.insert(token.clone(), definition);
        if previous.is_none() {
            self.order.push(token);
        } else {
            tracing::debug!(token = %token, "provider replaced");
        }
        previous
    }

    pub fn get(&self, token: &Token) -> Option<&ProviderDefinition> {
        self.definitions.get(token)
    }

    pub fn has(&self, token: &Token) -> bool {
        self.definitions.contains_key(token)
    }

    /// Tokens in first-registration order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.order.iter()
    }

    /// Definitions in first-registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ProviderDefinition> {
        self.order.iter().filter_map(|t| self.definitions.get(t))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::Provider;

    #[test]
    fn register_then_lookup() {
        let mut registry = Registry::new();
        registry.register(Provider::value("config", 1_u8)).unwrap();

        assert!(registry.has(&Token::named("config")));
        assert!(registry.get(&Token::named("config")).is_some());
        assert!(registry.get(&Token::named("other")).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_is_rejected_by_default() {
        let mut registry = Registry::new();
        registry.register(Provider::value("config", 1_u8)).unwrap();

        let err = registry.register(Provider::value("config", 2_u8)).unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateRegistration {
                token: Token::named("config")
            }
        );
    }

    #[test]
    fn replace_policy_lets_latest_win() {
        let mut registry = Registry::with_policy(RegistrationPolicy::Replace);
        registry.register(Provider::value("config", 1_u8)).unwrap();
        registry.register(Provider::value("config", 2_u16)).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(&Token::named("config")).unwrap().type_name().contains("u16"));
    }

    #[test]
    fn explicit_overwrite_ignores_policy() {
        let mut registry = Registry::new();
        registry.register(Provider::value("config", 1_u8)).unwrap();
        let previous = registry.register_or_replace(Provider::value("config", 2_u8));
        assert!(previous.is_some());
    }

    #[test]
    fn tokens_keep_registration_order() {
        let mut registry = Registry::new();
        for name in ["c", "a", "b"] {
            registry.register(Provider::value(name, ())).unwrap();
        }
        registry.register_or_replace(Provider::value("a", 1_u8));

        let order: Vec<_> = registry.tokens().map(Token::label).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn dependencies_are_stored_unvalidated() {
        let mut registry = Registry::new();
        let def = Provider::token::<u8>("needs-missing")
            .depends_on("missing")
            .construct(|_| Ok::<_, crate::domain::BoxError>(1));
        assert!(registry.register(def).is_ok());
    }
}
