//! In-memory descriptor table.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use hexy_core::{
    application::{ApplicationError, ports::DescriptorSource},
    domain::{Descriptor, Token},
    error::HexyResult,
};

/// Thread-safe token → descriptor map.
///
/// Plays the part of a metadata layer: whatever reads declarations (a
/// manifest, a code generator) fills the table, and provider builders look
/// their scope and dependencies up through the [`DescriptorSource`] port.
#[derive(Clone, Default)]
pub struct DescriptorTable {
    inner: Arc<RwLock<HashMap<Token, Descriptor>>>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `descriptor` for `token`, replacing any earlier entry.
    pub fn insert(&self, token: impl Into<Token>, descriptor: Descriptor) -> HexyResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "descriptor table",
            })?;
        inner.insert(token.into(), descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(Token, Descriptor)> for DescriptorTable {
    fn from_iter<I: IntoIterator<Item = (Token, Descriptor)>>(iter: I) -> Self {
        Self {
            inner: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}

impl DescriptorSource for DescriptorTable {
    fn descriptor(&self, token: &Token) -> Option<Descriptor> {
        self.inner.read().ok()?.get(token).cloned()
    }
}

impl std::fmt::Debug for DescriptorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorTable")
            .field("entries", &self.len())
            .finish()
    }
}
