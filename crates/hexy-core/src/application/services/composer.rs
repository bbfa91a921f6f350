//! Module composition: validate the import graph, then flatten every module's
//! providers into one registry.
//!
//! A module sees its own providers plus whatever its direct imports export.
//! An export is either one of the module's own providers or a re-export of
//! something an import exports, so visibility can travel several hops but
//! only when every intermediate module lists the token.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::{
    domain::{DomainError, Module, RegistrationPolicy, Registry, Token},
    error::HexyResult,
};

/// Result of composing a set of modules.
#[derive(Debug)]
pub struct Composition {
    pub registry: Registry,
    /// Module names with every import ahead of its importers.
    pub load_order: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Validates module graphs and builds registries from them.
#[derive(Debug, Clone, Default)]
pub struct ModuleComposer {
    policy: RegistrationPolicy,
}

impl ModuleComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicate-token policy for the registry being built.
    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self { policy }
    }

    /// Compose `modules`, which must include every module any of them imports.
    #[instrument(skip_all)]
    pub fn compose(&self, modules: impl IntoIterator<Item = Module>) -> HexyResult<Composition> {
        let modules: Vec<Module> = modules.into_iter().collect();
        let index = index_by_name(&modules)?;

        for module in &modules {
            for import in module.imports() {
                if !index.contains_key(import.as_str()) {
                    return Err(DomainError::ModuleNotFound {
                        module: module.name().to_string(),
                        import: import.clone(),
                    }
                    .into());
                }
            }
        }

        let load_order = load_order(&modules, &index)?;

        let mut exported: HashMap<&str, HashSet<Token>> = HashMap::new();
        let mut registry = Registry::with_policy(self.policy);

        for name in &load_order {
            let module = &modules[index[name.as_str()]];
            let own = module.provided_tokens();

            let imported: HashSet<Token> = module
                .imports()
                .iter()
                .filter_map(|import| exported.get(import.as_str()))
                .flatten()
                .cloned()
                .collect();

            for token in module.exports() {
                if !own.contains(token) && !imported.contains(token) {
                    return Err(DomainError::InvalidExport {
                        module: module.name().to_string(),
                        token: token.clone(),
                    }
                    .into());
                }
            }

            for provider in module.providers() {
                registry.register(provider.clone())?;

                let missing = provider
                    .dependencies()
                    .iter()
                    .find(|dep| !own.contains(*dep) && !imported.contains(*dep));
                if let Some(token) = missing {
                    return Err(DomainError::UnresolvedDependency {
                        module: module.name().to_string(),
                        provider: provider.token().clone(),
                        token: token.clone(),
                    }
                    .into());
                }
            }

            debug!(
                module = %module.name(),
                providers = module.providers().len(),
                exports = module.exports().len(),
                "module composed"
            );
            exported.insert(module.name(), module.exports().iter().cloned().collect());
        }

        Ok(Composition {
            registry,
            load_order,
        })
    }
}

/// Compose `modules` with the default policy and keep only the registry.
pub fn compose(modules: impl IntoIterator<Item = Module>) -> HexyResult<Registry> {
    Ok(ModuleComposer::new().compose(modules)?.registry)
}

fn index_by_name(modules: &[Module]) -> HexyResult<HashMap<&str, usize>> {
    let mut index = HashMap::with_capacity(modules.len());
    for (position, module) in modules.iter().enumerate() {
        if index.insert(module.name(), position).is_some() {
            return Err(DomainError::DuplicateModule {
                name: module.name().to_string(),
            }
            .into());
        }
    }
    Ok(index)
}

/// Depth-first post-order over imports, starting from each module in
/// declaration order. Each module is visited once.
fn load_order(modules: &[Module], index: &HashMap<&str, usize>) -> HexyResult<Vec<String>> {
    let mut state: HashMap<&str, Visit> = HashMap::new();
    let mut order = Vec::with_capacity(modules.len());
    let mut path = Vec::new();

    for module in modules {
        visit(module.name(), modules, index, &mut state, &mut path, &mut order)?;
    }
    Ok(order)
}

fn visit<'m>(
    name: &'m str,
    modules: &'m [Module],
    index: &HashMap<&str, usize>,
    state: &mut HashMap<&'m str, Visit>,
    path: &mut Vec<&'m str>,
    order: &mut Vec<String>,
) -> HexyResult<()> {
    match state.get(name) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => {
            let start = path.iter().position(|m| *m == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|m| m.to_string()).collect();
            cycle.push(name.to_string());
            return Err(DomainError::CircularModuleImport { path: cycle }.into());
        }
        None => {}
    }

    state.insert(name, Visit::InProgress);
    path.push(name);

    let module = &modules[index[name]];
    for import in module.imports() {
        visit(import.as_str(), modules, index, state, path, order)?;
    }

    path.pop();
    state.insert(name, Visit::Done);
    order.push(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoxError, Provider};

    fn value(token: &str) -> crate::domain::ProviderDefinition {
        Provider::value(token, ())
    }

    fn needing(token: &str, dep: &str) -> crate::domain::ProviderDefinition {
        Provider::token::<()>(token)
            .depends_on(dep)
            .construct(|_| Ok::<_, BoxError>(()))
    }

    #[test]
    fn imports_load_before_importers() {
        let app = Module::builder("app").import("infra").build();
        let infra = Module::builder("infra").import("domain").build();
        let domain = Module::builder("domain").build();

        let composition = ModuleComposer::new().compose([app, infra, domain]).unwrap();
        assert_eq!(composition.load_order, ["domain", "infra", "app"]);
    }

    #[test]
    fn diamond_visits_shared_module_once() {
        let shared = Module::builder("shared").provider(value("clock")).export("clock").build();
        let left = Module::builder("left").import("shared").build();
        let right = Module::builder("right").import("shared").build();
        let top = Module::builder("top").import("left").import("right").build();

        let composition = ModuleComposer::new()
            .compose([top, left, right, shared])
            .unwrap();
        assert_eq!(composition.load_order.len(), 4);
        assert_eq!(composition.registry.len(), 1);
    }

    #[test]
    fn three_module_cycle_reports_full_path() {
        let a = Module::builder("a").import("b").build();
        let b = Module::builder("b").import("c").build();
        let c = Module::builder("c").import("a").build();

        let err = compose([a, b, c]).unwrap_err();
        assert_eq!(
            err.as_domain(),
            Some(&DomainError::CircularModuleImport {
                path: vec!["a".into(), "b".into(), "c".into(), "a".into()]
            })
        );
    }

    #[test]
    fn unknown_import_fails() {
        let app = Module::builder("app").import("ghost").build();
        let err = compose([app]).unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::ModuleNotFound { import, .. }) if import == "ghost"
        ));
    }

    #[test]
    fn duplicate_module_name_fails() {
        let err = compose([Module::builder("a").build(), Module::builder("a").build()]).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::DuplicateModule { .. })));
    }

    #[test]
    fn exporting_an_unknown_token_fails() {
        let m = Module::builder("m").export("nothing").build();
        let err = compose([m]).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidExport { .. })));
    }

    #[test]
    fn own_providers_are_visible_to_each_other() {
        let m = Module::builder("m")
            .provider(value("config"))
            .provider(needing("service", "config"))
            .build();
        assert!(compose([m]).is_ok());
    }

    #[test]
    fn same_token_in_two_modules_is_rejected() {
        let a = Module::builder("a").provider(value("x")).build();
        let b = Module::builder("b").provider(value("x")).build();
        let err = compose([a, b]).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::DuplicateRegistration { .. })));

        let a = Module::builder("a").provider(value("x")).build();
        let b = Module::builder("b").provider(value("x")).build();
        let composition = ModuleComposer::with_policy(RegistrationPolicy::Replace)
            .compose([a, b])
            .unwrap();
        assert_eq!(composition.registry.len(), 1);
    }
}
