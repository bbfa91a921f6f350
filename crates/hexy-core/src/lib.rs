//! Hexy Core - Dependency Injection and Module System
//!
//! This crate provides the domain and application layers of Hexy's
//! dependency-injection container, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     hexy-cli / transport adapters       │
//! │   (bootstrap, per-request contexts)     │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (Container, ModuleComposer, Orchestrator)│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (DescriptorSource, ModuleSource)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      hexy-adapters (Infrastructure)     │
//! │ (ManifestLoader, DescriptorTable, etc)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Token, Provider, Module, Registry)    │
//! │         No I/O                          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use hexy_core::prelude::*;
//!
//! struct Database;
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let domain = Module::builder("domain")
//!     .provider(Provider::class::<Database>().construct(|_| Ok::<_, BoxError>(Database)))
//!     .provider(
//!         Provider::class::<UserService>()
//!             .depends_on(Token::of::<Database>())
//!             .construct(|deps| Ok::<_, BoxError>(UserService { db: deps.of()? })),
//!     )
//!     .export(Token::of::<UserService>())
//!     .build();
//!
//! let container = Container::from_modules([domain])?;
//! let users = container.get::<UserService>()?;
//! assert!(Arc::ptr_eq(&users.db, &container.get::<Database>()?));
//! container.teardown()?;
//! # Ok::<(), HexyError>(())
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Composition, Container, ModuleComposer, Orchestrator, RequestHandler, SharedHandler,
        compose,
        ports::{DescriptorSource, ModuleSource},
    };
    pub use crate::domain::{
        BoxError, Dependencies, Descriptor, Injectable, Instance, Lifecycle, Module, Provider,
        ProviderDefinition, RegistrationPolicy, Registry, ResolutionContext, Scope, Token,
    };
    pub use crate::error::{HexyError, HexyResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
