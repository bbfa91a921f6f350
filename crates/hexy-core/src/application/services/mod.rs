//! Application services.
//!
//! - `container`: resolution, caching per scope, lifecycle and teardown
//! - `composer`: module graph validation and flattening into a registry
//! - `orchestrator`: request-type routing on top of a container

pub mod composer;
pub mod container;
pub mod orchestrator;

pub use composer::{Composition, ModuleComposer, compose};
pub use container::Container;
pub use orchestrator::{Orchestrator, RequestHandler, SharedHandler};
