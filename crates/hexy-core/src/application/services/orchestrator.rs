//! Request routing on top of a container.
//!
//! Handlers are ordinary providers. The orchestrator only remembers which
//! token handles which request type, and gives every call its own
//! `ResolutionContext` so request-scoped collaborators live exactly as long
//! as the call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    application::{ApplicationError, services::Container},
    domain::{BoxError, ResolutionContext, Token},
    error::HexyResult,
};

/// Handles one kind of request.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: Value) -> Result<Value, BoxError>;
}

impl<F> RequestHandler for F
where
    F: Fn(Value) -> Result<Value, BoxError> + Send + Sync,
{
    fn handle(&self, request: Value) -> Result<Value, BoxError> {
        self(request)
    }
}

/// What a handler provider produces.
pub type SharedHandler = Arc<dyn RequestHandler>;

/// Mediator dispatching request types to handler providers.
pub struct Orchestrator {
    container: Arc<Container>,
    handlers: HashMap<String, Token>,
}

impl Orchestrator {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            handlers: HashMap::new(),
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Route `request_type` to the provider registered under `handler`.
    ///
    /// The provider must produce a [`SharedHandler`]. Registering the same
    /// request type twice keeps the latest token.
    pub fn register_handler(&mut self, request_type: impl Into<String>, handler: impl Into<Token>) {
        let request_type = request_type.into();
        let handler = handler.into();
        debug!(request_type = %request_type, handler = %handler, "handler registered");
        if let Some(previous) = self.handlers.insert(request_type.clone(), handler) {
            warn!(request_type = %request_type, previous = %previous, "handler replaced");
        }
    }

    pub fn has_handler(&self, request_type: &str) -> bool {
        self.handlers.contains_key(request_type)
    }

    /// Registered request types, sorted.
    pub fn request_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Resolve the handler for `request_type` in a fresh context, run it, and
    /// end the context.
    ///
    /// The context is ended even when resolution or the handler fails; the
    /// handler's error takes precedence over a teardown error.
    #[instrument(skip(self, request), fields(request_type = %request_type))]
    pub fn coordinate(&self, request_type: &str, request: Value) -> HexyResult<Value> {
        let token = self.handlers.get(request_type).ok_or_else(|| {
            ApplicationError::NoHandlerRegistered {
                request_type: request_type.to_string(),
            }
        })?;

        let mut context = ResolutionContext::new();
        let outcome = self
            .container
            .resolve_as_in::<SharedHandler>(token, &mut context)
            .and_then(|handler| {
                handler.handle(request).map_err(|e| {
                    ApplicationError::HandlerFailed {
                        request_type: request_type.to_string(),
                        reason: e.to_string(),
                    }
                    .into()
                })
            });
        let ended = self.container.end_context(context);

        let response = outcome?;
        ended?;
        Ok(response)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("handlers", &self.handlers)
            .finish()
    }
}
