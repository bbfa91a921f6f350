//! In-memory module source.

use std::sync::{Arc, RwLock};

use hexy_core::{
    application::{ApplicationError, ports::ModuleSource},
    domain::Module,
    error::HexyResult,
};

/// Module source backed by a list built in code.
#[derive(Clone, Default)]
pub struct InMemoryModuleSource {
    modules: Arc<RwLock<Vec<Module>>>,
}

impl InMemoryModuleSource {
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Self {
        Self {
            modules: Arc::new(RwLock::new(modules.into_iter().collect())),
        }
    }

    pub fn push(&self, module: Module) -> HexyResult<()> {
        self.modules
            .write()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "module list",
            })?
            .push(module);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.modules.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModuleSource for InMemoryModuleSource {
    fn load(&self) -> HexyResult<Vec<Module>> {
        let modules = self
            .modules
            .read()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "module list",
            })?;
        Ok(modules.clone())
    }
}
