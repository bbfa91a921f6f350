//! Modules: named bundles of providers with import/export visibility.

use std::collections::HashSet;

use crate::domain::provider::ProviderDefinition;
use crate::domain::token::Token;

/// A named bundle of providers.
///
/// Imports are by module name; the composer resolves them against the set of
/// modules it was given. A module can see its own providers plus whatever its
/// direct imports export. Nothing else.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    providers: Vec<ProviderDefinition>,
    imports: Vec<String>,
    exports: Vec<Token>,
}

impl Module {
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            module: Module {
                name: name.into(),
                providers: Vec::new(),
                imports: Vec::new(),
                exports: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn providers(&self) -> &[ProviderDefinition] {
        &self.providers
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn exports(&self) -> &[Token] {
        &self.exports
    }

    /// Tokens this module provides itself.
    pub fn provided_tokens(&self) -> HashSet<Token> {
        self.providers.iter().map(|p| p.token().clone()).collect()
    }

    pub fn provides(&self, token: &Token) -> bool {
        self.providers.iter().any(|p| p.token() == token)
    }
}

pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn provider(mut self, definition: ProviderDefinition) -> Self {
        self.module.providers.push(definition);
        self
    }

    pub fn providers(mut self, definitions: impl IntoIterator<Item = ProviderDefinition>) -> Self {
        self.module.providers.extend(definitions);
        self
    }

    pub fn import(mut self, module: impl Into<String>) -> Self {
        self.module.imports.push(module.into());
        self
    }

    pub fn export(mut self, token: impl Into<Token>) -> Self {
        self.module.exports.push(token.into());
        self
    }

    pub fn build(self) -> Module {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::Provider;

    #[test]
    fn builder_collects_parts() {
        let module = Module::builder("domain")
            .provider(Provider::value("service", 1_u8))
            .provider(Provider::value("helper", 2_u8))
            .import("shared")
            .export("service")
            .build();

        assert_eq!(module.name(), "domain");
        assert_eq!(module.providers().len(), 2);
        assert_eq!(module.imports(), ["shared".to_string()]);
        assert_eq!(module.exports(), [Token::named("service")]);
        assert!(module.provides(&Token::named("helper")));
        assert!(!module.provides(&Token::named("other")));
        assert_eq!(module.provided_tokens().len(), 2);
    }
}
