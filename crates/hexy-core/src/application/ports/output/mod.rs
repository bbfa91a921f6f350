//! Driven (output) ports - implemented by infrastructure.

use crate::domain::{Descriptor, DomainError, Module, Scope, Token};
use crate::error::HexyResult;

/// Port for provider metadata declared outside the code that builds it.
///
/// Rust has no runtime reflection, so "what does this class need" is either
/// spelled out on the builder, answered by an `Injectable` impl, or looked up
/// here.
///
/// Implemented by:
/// - `hexy_adapters::DescriptorTable` (in-memory)
pub trait DescriptorSource: Send + Sync {
    /// Metadata for `token`, or `None` if this source knows nothing about it.
    fn descriptor(&self, token: &Token) -> Option<Descriptor>;

    /// Constructor dependency tokens of `token`, in parameter order.
    fn dependency_tokens(&self, token: &Token) -> Option<Vec<Token>> {
        self.descriptor(token).map(|d| d.dependencies)
    }

    fn scope(&self, token: &Token) -> Option<Scope> {
        self.descriptor(token).map(|d| d.scope)
    }
}

/// Port for loading module definitions.
///
/// Implemented by:
/// - `hexy_adapters::ManifestLoader` (TOML manifests on disk)
/// - `hexy_adapters::InMemoryModuleSource` (testing)
pub trait ModuleSource: Send + Sync {
    /// Produce every module this source defines.
    fn load(&self) -> HexyResult<Vec<Module>>;
}

/// Look up `token` in `source`, failing with `MissingDescriptor` when absent.
pub fn describe(source: &dyn DescriptorSource, token: &Token) -> HexyResult<Descriptor> {
    source.descriptor(token).ok_or_else(|| {
        DomainError::MissingDescriptor {
            token: token.clone(),
        }
        .into()
    })
}
