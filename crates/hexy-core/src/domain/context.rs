//! Caller-owned cache for request-scoped instances.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::domain::lifecycle::{LifecycleTracker, OwnedInstance};
use crate::domain::provider::Instance;
use crate::domain::token::Token;

/// One logical operation's worth of request-scoped instances.
///
/// Created by whoever starts the operation (a transport adapter, the
/// [`Orchestrator`](crate::application::Orchestrator)), passed to
/// `Container::resolve_in`, and handed back to `Container::end_context` when
/// the operation is over. The container only borrows it for the length of a
/// call.
pub struct ResolutionContext {
    id: Uuid,
    instances: HashMap<Token, Instance>,
    created: Vec<OwnedInstance>,
    tracker: LifecycleTracker,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            instances: HashMap::new(),
            created: Vec::new(),
            tracker: LifecycleTracker::new(),
        }
    }

    /// Correlation id, used in tracing spans.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn get(&self, token: &Token) -> Option<Instance> {
        self.instances.get(token).cloned()
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.instances.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut LifecycleTracker {
        &mut self.tracker
    }

    pub(crate) fn store(&mut self, owned: OwnedInstance) {
        self.instances
            .insert(owned.token.clone(), owned.instance.clone());
        self.created.push(owned);
    }

    /// Split into creation-ordered instances and their tracker.
    pub(crate) fn into_parts(self) -> (Vec<OwnedInstance>, LifecycleTracker) {
        (self.created, self.tracker)
    }
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("id", &self.id)
            .field("instances", &self.created.len())
            .finish()
    }
}
