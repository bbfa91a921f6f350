//! Application layer for Hexy.
//!
//! This layer contains:
//! - **Services**: the `Container` that resolves providers, the
//!   `ModuleComposer` that flattens modules into a registry, and the
//!   `Orchestrator` that routes requests to handlers
//! - **Ports**: interfaces adapters implement (descriptor and module sources)
//! - **Errors**: runtime failures of factories, hooks and handlers
//!
//! Wiring rules (what a token is, who may see which provider) live in
//! `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    Composition, Container, ModuleComposer, Orchestrator, RequestHandler, SharedHandler, compose,
};

pub use ports::{DescriptorSource, ModuleSource, describe};

pub use error::ApplicationError;
