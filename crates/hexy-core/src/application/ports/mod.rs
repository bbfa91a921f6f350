//! Application ports (traits) for external dependencies.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the application, implemented by
//!   infrastructure in `hexy-adapters`
//!   - `DescriptorSource`: scope and dependency metadata for a token
//!   - `ModuleSource`: module definitions loaded from outside (manifests)
//!
//! - **Driving (Input) Ports**: the `Container` and `Orchestrator` APIs
//!   themselves

pub mod output;

pub use output::{DescriptorSource, ModuleSource, describe};
