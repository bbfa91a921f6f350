//! Instance lifecycle: init/destroy hooks and the tracker that guarantees each
//! hook fires at most once per instance.
//!
//! State is keyed by [`InstanceId`], a handle assigned when the container
//! creates an instance, never by token. Two instances of the same transient
//! provider therefore have independent state. Entries are removed explicitly
//! when their instance is torn down.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::provider::{BoxError, Instance};
use crate::domain::token::Token;

/// Hooks a provided type can implement.
///
/// Opt in per provider with
/// [`ProviderBuilder::with_lifecycle`](crate::domain::ProviderBuilder::with_lifecycle).
pub trait Lifecycle: Send + Sync + 'static {
    /// Runs once, after every constructor dependency has been resolved and
    /// initialised.
    fn on_init(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Runs at most once, when the owner of the instance tears it down.
    fn on_destroy(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Type-erased hook over an [`Instance`].
pub type Hook = Arc<dyn Fn(&Instance) -> Result<(), BoxError> + Send + Sync>;

/// The hooks attached to a provider definition.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    on_init: Option<Hook>,
    on_destroy: Option<Hook>,
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that forward to `T`'s [`Lifecycle`] implementation.
    pub fn for_type<T: Lifecycle>() -> Self {
        Self::new()
            .with_init(typed::<T>(|value| value.on_init()))
            .with_destroy(typed::<T>(|value| value.on_destroy()))
    }

    pub fn with_init(mut self, hook: Hook) -> Self {
        self.on_init = Some(hook);
        self
    }

    pub fn with_destroy(mut self, hook: Hook) -> Self {
        self.on_destroy = Some(hook);
        self
    }

    pub fn on_init(&self) -> Option<&Hook> {
        self.on_init.as_ref()
    }

    pub fn on_destroy(&self) -> Option<&Hook> {
        self.on_destroy.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.on_init.is_none() && self.on_destroy.is_none()
    }

    /// Run `self`'s hooks, then `later`'s. The first failing hook stops the chain.
    pub fn then(self, later: LifecycleHooks) -> Self {
        Self {
            on_init: chain(self.on_init, later.on_init),
            on_destroy: chain(self.on_destroy, later.on_destroy),
        }
    }
}

fn chain(first: Option<Hook>, second: Option<Hook>) -> Option<Hook> {
    match (first, second) {
        (Some(first), Some(second)) => Some(Arc::new(move |instance: &Instance| {
            first(instance)?;
            second(instance)
        })),
        (first, None) => first,
        (None, second) => second,
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("on_init", &self.on_init.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

/// Lift a typed hook to a [`Hook`] that downcasts the instance first.
pub(crate) fn typed<T>(hook: impl Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static) -> Hook
where
    T: Send + Sync + 'static,
{
    Arc::new(move |instance: &Instance| match instance.downcast_ref::<T>() {
        Some(value) => hook(value),
        None => Err(format!(
            "lifecycle hook expected an instance of {}",
            std::any::type_name::<T>()
        )
        .into()),
    })
}

// ── Instance handles ────────────────────────────────────────────────────────

/// Stable handle for one created instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate the next id. Ids are unique for the life of the process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-instance hook state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleState {
    pub initialized: bool,
    pub destroy_called: bool,
}

/// Table of lifecycle states, owned by whoever owns the instances.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    states: HashMap<InstanceId, LifecycleState>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a freshly created instance.
    pub fn track(&mut self, id: InstanceId) {
        self.states.entry(id).or_default();
    }

    pub fn state(&self, id: InstanceId) -> Option<LifecycleState> {
        self.states.get(&id).copied()
    }

    pub fn is_initialized(&self, id: InstanceId) -> bool {
        self.states.get(&id).is_some_and(|s| s.initialized)
    }

    pub fn mark_initialized(&mut self, id: InstanceId) {
        self.states.entry(id).or_default().initialized = true;
    }

    /// Claim the destroy hook for `id`.
    ///
    /// Returns `true` exactly once per tracked instance; untracked ids are
    /// never claimed because the tracker's owner did not create them.
    pub fn claim_destroy(&mut self, id: InstanceId) -> bool {
        match self.states.get_mut(&id) {
            Some(state) if !state.destroy_called => {
                state.destroy_called = true;
                true
            }
            _ => false,
        }
    }

    /// Stop tracking `id`.
    pub fn release(&mut self, id: InstanceId) -> Option<LifecycleState> {
        self.states.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

// ── Owned instances ─────────────────────────────────────────────────────────

/// An instance some owner (container or context) created and must destroy.
#[derive(Clone)]
pub struct OwnedInstance {
    pub token: Token,
    pub id: InstanceId,
    pub instance: Instance,
    pub hooks: Option<LifecycleHooks>,
}

impl fmt::Debug for OwnedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedInstance")
            .field("token", &self.token)
            .field("id", &self.id)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// One destroy hook that returned an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub token: Token,
    pub reason: String,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.token, self.reason)
    }
}

/// Destroy `owned` last-created-first, each at most once.
///
/// Every hook is attempted even when an earlier one fails; failures are
/// returned in the order they happened.
pub fn destroy_in_reverse(
    owned: Vec<OwnedInstance>,
    tracker: &mut LifecycleTracker,
) -> Vec<HookFailure> {
    let mut failures = Vec::new();

    for entry in owned.into_iter().rev() {
        if tracker.claim_destroy(entry.id) {
            if let Some(hook) = entry.hooks.as_ref().and_then(LifecycleHooks::on_destroy) {
                tracing::debug!(token = %entry.token, id = %entry.id, "running destroy hook");
                if let Err(e) = hook(&entry.instance) {
                    tracing::warn!(token = %entry.token, error = %e, "destroy hook failed");
                    failures.push(HookFailure {
                        token: entry.token.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        tracker.release(entry.id);
    }

    failures
}
