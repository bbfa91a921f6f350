//! Infrastructure adapters for Hexy.
//!
//! This crate implements the ports defined in `hexy-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod descriptor_table;
pub mod manifest;
pub mod memory_source;

// Re-export commonly used adapters
pub use descriptor_table::DescriptorTable;
pub use manifest::{ApplicationManifest, ManifestComponent, ManifestError, ManifestLoader};
pub use memory_source::InMemoryModuleSource;
