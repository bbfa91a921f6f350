//! The dependency injection container.
//!
//! Resolution walks a provider's declared dependencies depth-first, caching
//! per scope:
//!
//! | Scope       | Cached in                     | Destroyed by            |
//! |-------------|-------------------------------|-------------------------|
//! | `Singleton` | the container                 | `Container::teardown`   |
//! | `Request`   | the caller's `ResolutionContext` | `Container::end_context` |
//! | `Transient` | nowhere                       | the caller (never hooked) |
//!
//! Value providers are returned as registered and never pass through
//! lifecycle hooks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, instrument, trace, warn};

use crate::{
    application::ApplicationError,
    domain::{
        Activation, Dependencies, DomainError, Instance, InstanceId, LifecycleHooks,
        LifecycleTracker, Module, OwnedInstance, ProviderDefinition, Registry, ResolutionContext,
        Scope, Token, destroy_in_reverse,
    },
    error::HexyResult,
};

use super::composer::compose;

/// Lazily-filled singleton cell, one per token.
///
/// Resolving a singleton locks only its own cell, so two threads racing for
/// the same token build it once while unrelated tokens proceed in parallel.
type Slot = Arc<Mutex<Option<Instance>>>;

/// Dependency injection container.
///
/// Shareable across threads (`Arc<Container>`); every method takes `&self`.
pub struct Container {
    registry: RwLock<Registry>,
    singletons: RwLock<HashMap<Token, Slot>>,
    owned: Mutex<Vec<OwnedInstance>>,
    tracker: Mutex<LifecycleTracker>,
}

impl Container {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: RwLock::new(registry),
            singletons: RwLock::new(HashMap::new()),
            owned: Mutex::new(Vec::new()),
            tracker: Mutex::new(LifecycleTracker::new()),
        }
    }

    /// Compose `modules` and build a container over the result.
    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> HexyResult<Self> {
        Ok(Self::new(compose(modules)?))
    }

    // ── Registration ────────────────────────────────────────────────────────

    /// Register a definition, following the registry's duplicate policy.
    pub fn register(&self, definition: ProviderDefinition) -> HexyResult<()> {
        let token = definition.token().clone();
        let replaced = {
            let mut registry = self.write_registry()?;
            let existed = registry.has(&token);
            registry.register(definition)?;
            existed
        };
        if replaced {
            self.evict(&token)?;
        }
        Ok(())
    }

    /// Register a definition, replacing any existing one.
    ///
    /// A singleton already built for the old definition stays owned by the
    /// container (it is still destroyed at teardown) but is no longer handed
    /// out.
    pub fn register_or_replace(&self, definition: ProviderDefinition) -> HexyResult<()> {
        let token = definition.token().clone();
        if self.write_registry()?.register_or_replace(definition).is_some() {
            self.evict(&token)?;
        }
        Ok(())
    }

    /// Register a pre-built value under `token`.
    pub fn register_value<T: Send + Sync + 'static>(
        &self,
        token: impl Into<Token>,
        value: T,
    ) -> HexyResult<()> {
        self.register(crate::domain::Provider::value(token, value))
    }

    pub fn has(&self, token: &Token) -> HexyResult<bool> {
        Ok(self.read_registry()?.has(token))
    }

    /// Definition registered under `token`.
    pub fn definition(&self, token: &Token) -> HexyResult<ProviderDefinition> {
        self.read_registry()?
            .get(token)
            .cloned()
            .ok_or_else(|| {
                DomainError::ServiceNotFound {
                    token: token.clone(),
                }
                .into()
            })
    }

    /// Registered tokens, in registration order.
    pub fn tokens(&self) -> HexyResult<Vec<Token>> {
        Ok(self.read_registry()?.tokens().cloned().collect())
    }

    pub fn len(&self) -> HexyResult<usize> {
        Ok(self.read_registry()?.len())
    }

    pub fn is_empty(&self) -> HexyResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of live singleton and transient-in-init instances the container tracks.
    pub fn tracked_instances(&self) -> HexyResult<usize> {
        Ok(self.lock_tracker()?.len())
    }

    // ── Resolution ──────────────────────────────────────────────────────────

    /// Resolve `token` with no resolution context.
    ///
    /// Fails with `MissingScopeContext` if anything on the way is
    /// request-scoped.
    #[instrument(skip_all, fields(token = %token))]
    pub fn resolve(&self, token: &Token) -> HexyResult<Instance> {
        self.resolve_with(token, None, &mut Vec::new())
    }

    /// Resolve `token`, caching request-scoped instances in `context`.
    #[instrument(skip_all, fields(token = %token, context = %context.id()))]
    pub fn resolve_in(&self, token: &Token, context: &mut ResolutionContext) -> HexyResult<Instance> {
        self.resolve_with(token, Some(context), &mut Vec::new())
    }

    /// Resolve and downcast.
    pub fn resolve_as<T: Send + Sync + 'static>(&self, token: &Token) -> HexyResult<Arc<T>> {
        downcast(token, self.resolve(token)?)
    }

    /// Resolve in `context` and downcast.
    pub fn resolve_as_in<T: Send + Sync + 'static>(
        &self,
        token: &Token,
        context: &mut ResolutionContext,
    ) -> HexyResult<Arc<T>> {
        downcast(token, self.resolve_in(token, context)?)
    }

    /// Resolve the provider registered under `T`'s class token.
    pub fn get<T: Send + Sync + 'static>(&self) -> HexyResult<Arc<T>> {
        self.resolve_as(&Token::of::<T>())
    }

    /// Resolve every token in order. The first failure aborts the batch.
    pub fn resolve_many(&self, tokens: &[Token]) -> HexyResult<Vec<Instance>> {
        tokens.iter().map(|token| self.resolve(token)).collect()
    }

    /// Resolve every token in order within `context`.
    pub fn resolve_many_in(
        &self,
        tokens: &[Token],
        context: &mut ResolutionContext,
    ) -> HexyResult<Vec<Instance>> {
        tokens
            .iter()
            .map(|token| self.resolve_in(token, context))
            .collect()
    }

    fn resolve_with(
        &self,
        token: &Token,
        context: Option<&mut ResolutionContext>,
        stack: &mut Vec<Token>,
    ) -> HexyResult<Instance> {
        let definition = self.definition(token)?;

        if let Activation::Value(value) = definition.activation() {
            return Ok(Arc::clone(value));
        }

        // Checked before any cache lock: a cycle through a singleton would
        // otherwise try to re-lock its own slot.
        if let Some(start) = stack.iter().position(|t| t == token) {
            let mut path = stack[start..].to_vec();
            path.push(token.clone());
            return Err(DomainError::CircularDependency { path }.into());
        }

        match definition.scope() {
            Scope::Singleton => self.resolve_singleton(&definition, stack),
            Scope::Request => {
                let Some(context) = context else {
                    return Err(DomainError::MissingScopeContext {
                        token: token.clone(),
                    }
                    .into());
                };
                self.resolve_request(&definition, context, stack)
            }
            Scope::Transient => {
                let instance = self.instantiate(&definition, context, stack)?;
                let owned = own(&definition, &instance);
                self.initialize(&owned)?;
                // Nobody destroys transients, so stop tracking once init ran.
                self.lock_tracker()?.release(owned.id);
                trace!(token = %token, "transient created");
                Ok(instance)
            }
        }
    }

    fn resolve_singleton(
        &self,
        definition: &ProviderDefinition,
        stack: &mut Vec<Token>,
    ) -> HexyResult<Instance> {
        let token = definition.token();
        let slot = self.slot(token)?;
        let mut cell = slot.lock().map_err(|_| poisoned("singleton slot"))?;

        if let Some(instance) = cell.as_ref() {
            trace!(token = %token, "singleton cache hit");
            return Ok(Arc::clone(instance));
        }

        // Singletons outlive any one request, so their graph never sees a context.
        let instance = self.instantiate(definition, None, stack)?;
        let owned = own(definition, &instance);
        self.initialize(&owned)?;

        *cell = Some(Arc::clone(&instance));
        debug!(token = %token, id = %owned.id, "singleton created");
        self.lock_owned()?.push(owned);
        Ok(instance)
    }

    fn resolve_request(
        &self,
        definition: &ProviderDefinition,
        context: &mut ResolutionContext,
        stack: &mut Vec<Token>,
    ) -> HexyResult<Instance> {
        let token = definition.token();
        if let Some(instance) = context.get(token) {
            trace!(token = %token, "request cache hit");
            return Ok(instance);
        }

        let instance = self.instantiate(definition, Some(&mut *context), stack)?;
        let owned = own(definition, &instance);

        let tracker = context.tracker_mut();
        tracker.track(owned.id);
        if let Err(e) = run_init_hook(&owned) {
            tracker.release(owned.id);
            return Err(e);
        }
        tracker.mark_initialized(owned.id);

        debug!(token = %token, id = %owned.id, context = %context.id(), "request instance created");
        context.store(owned);
        Ok(instance)
    }

    /// Resolve dependencies in declared order, then call the factory.
    fn instantiate(
        &self,
        definition: &ProviderDefinition,
        mut context: Option<&mut ResolutionContext>,
        stack: &mut Vec<Token>,
    ) -> HexyResult<Instance> {
        stack.push(definition.token().clone());

        let result = definition
            .dependencies()
            .iter()
            .map(|dependency| {
                self.resolve_with(dependency, context.as_deref_mut(), stack)
                    .map(|instance| (dependency.clone(), instance))
            })
            .collect::<HexyResult<Vec<_>>>()
            .and_then(|entries| activate(definition, &Dependencies::new(entries)));

        stack.pop();
        result
    }

    /// Track `owned` in the container and run its init hook once.
    ///
    /// The tracker lock is not held while the hook runs.
    fn initialize(&self, owned: &OwnedInstance) -> HexyResult<()> {
        let needs_init = {
            let mut tracker = self.lock_tracker()?;
            tracker.track(owned.id);
            !tracker.is_initialized(owned.id)
        };
        if !needs_init {
            return Ok(());
        }

        if let Err(e) = run_init_hook(owned) {
            self.lock_tracker()?.release(owned.id);
            return Err(e);
        }
        self.lock_tracker()?.mark_initialized(owned.id);
        Ok(())
    }

    // ── Teardown ────────────────────────────────────────────────────────────

    /// Destroy every singleton the container built, last-created first.
    ///
    /// Every destroy hook is attempted; failures are aggregated into one
    /// `ApplicationError::Teardown`. A second call finds nothing to destroy.
    /// The container stays usable: later resolutions build fresh singletons.
    #[instrument(skip(self))]
    pub fn teardown(&self) -> HexyResult<()> {
        let owned = std::mem::take(&mut *self.lock_owned()?);
        self.write_singletons()?.clear();
        let mut tracker = std::mem::take(&mut *self.lock_tracker()?);

        debug!(instances = owned.len(), "tearing down container");
        let failures = destroy_in_reverse(owned, &mut tracker);

        if failures.is_empty() {
            Ok(())
        } else {
            warn!(failed = failures.len(), "teardown finished with failures");
            Err(ApplicationError::Teardown { failures }.into())
        }
    }

    /// Destroy the request-scoped instances created in `context`.
    ///
    /// Taking the context by value makes ending it twice impossible.
    #[instrument(skip_all, fields(context = %context.id()))]
    pub fn end_context(&self, context: ResolutionContext) -> HexyResult<()> {
        let (owned, mut tracker) = context.into_parts();
        debug!(instances = owned.len(), "ending resolution context");
        let failures = destroy_in_reverse(owned, &mut tracker);

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::Teardown { failures }.into())
        }
    }

    // ── Locks ───────────────────────────────────────────────────────────────

    fn slot(&self, token: &Token) -> HexyResult<Slot> {
        if let Some(slot) = self.read_singletons()?.get(token) {
            return Ok(Arc::clone(slot));
        }
        Ok(Arc::clone(
            self.write_singletons()?.entry(token.clone()).or_default(),
        ))
    }

    fn evict(&self, token: &Token) -> HexyResult<()> {
        if self.write_singletons()?.remove(token).is_some() {
            debug!(token = %token, "cached singleton evicted by re-registration");
        }
        Ok(())
    }

    fn read_registry(&self) -> HexyResult<RwLockReadGuard<'_, Registry>> {
        self.registry.read().map_err(|_| poisoned("registry"))
    }

    fn write_registry(&self) -> HexyResult<RwLockWriteGuard<'_, Registry>> {
        self.registry.write().map_err(|_| poisoned("registry"))
    }

    fn read_singletons(&self) -> HexyResult<RwLockReadGuard<'_, HashMap<Token, Slot>>> {
        self.singletons.read().map_err(|_| poisoned("singleton cache"))
    }

    fn write_singletons(&self) -> HexyResult<RwLockWriteGuard<'_, HashMap<Token, Slot>>> {
        self.singletons.write().map_err(|_| poisoned("singleton cache"))
    }

    fn lock_owned(&self) -> HexyResult<MutexGuard<'_, Vec<OwnedInstance>>> {
        self.owned.lock().map_err(|_| poisoned("owned instances"))
    }

    fn lock_tracker(&self) -> HexyResult<MutexGuard<'_, LifecycleTracker>> {
        self.tracker.lock().map_err(|_| poisoned("lifecycle tracker"))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("providers", &self.len().ok())
            .field("tracked", &self.tracked_instances().ok())
            .finish()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn activate(definition: &ProviderDefinition, deps: &Dependencies) -> HexyResult<Instance> {
    match definition.activation() {
        Activation::Factory(factory) => factory(deps).map_err(|e| {
            ApplicationError::InstantiationFailed {
                token: definition.token().clone(),
                reason: e.to_string(),
            }
            .into()
        }),
        Activation::Value(value) => Ok(Arc::clone(value)),
    }
}

fn own(definition: &ProviderDefinition, instance: &Instance) -> OwnedInstance {
    OwnedInstance {
        token: definition.token().clone(),
        id: InstanceId::next(),
        instance: Arc::clone(instance),
        hooks: definition.hooks().cloned(),
    }
}

fn run_init_hook(owned: &OwnedInstance) -> HexyResult<()> {
    let Some(hook) = owned.hooks.as_ref().and_then(LifecycleHooks::on_init) else {
        return Ok(());
    };
    debug!(token = %owned.token, id = %owned.id, "running init hook");
    hook(&owned.instance).map_err(|e| {
        ApplicationError::InitHookFailed {
            token: owned.token.clone(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn downcast<T: Send + Sync + 'static>(token: &Token, instance: Instance) -> HexyResult<Arc<T>> {
    instance.downcast::<T>().map_err(|_| {
        ApplicationError::TypeMismatch {
            token: token.clone(),
            expected: std::any::type_name::<T>(),
        }
        .into()
    })
}

fn poisoned(resource: &'static str) -> crate::error::HexyError {
    ApplicationError::LockPoisoned { resource }.into()
}
