// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Hexy.
//!
//! The vocabulary of dependency injection, with no I/O:
//!
//! - **Tokens** identify dependencies.
//! - **Provider definitions** say how to build the instance behind a token.
//! - **Modules** bundle providers and decide who can see them.
//! - **Registry** stores definitions; **ResolutionContext** caches
//!   request-scoped instances for one operation.
//! - **Lifecycle** hooks and the tracker that keeps them to once per instance.
//!
//! Resolution itself (the algorithm that walks dependencies) lives in
//! `crate::application::services::container`.

pub mod context;
pub mod error;
pub mod lifecycle;
pub mod module;
pub mod provider;
pub mod registry;
pub mod scope;
pub mod token;

pub use context::ResolutionContext;
pub use error::{DomainError, ErrorCategory};
pub use lifecycle::{
    Hook, HookFailure, InstanceId, Lifecycle, LifecycleHooks, LifecycleState, LifecycleTracker,
    OwnedInstance, destroy_in_reverse,
};
pub use module::{Module, ModuleBuilder};
pub use provider::{
    Activation, BoxError, Dependencies, DependencyError, Descriptor, FactoryFn, Injectable,
    Instance, Provider, ProviderBuilder, ProviderDefinition,
};
pub use registry::{RegistrationPolicy, Registry};
pub use scope::Scope;
pub use token::{Token, render_path};
