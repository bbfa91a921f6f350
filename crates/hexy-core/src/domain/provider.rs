//! Provider definitions: the recipe a container follows to produce an
//! instance for a token.
//!
//! There is no reflection to lean on, so every provider states its
//! dependencies and scope explicitly, through one of:
//!
//! - the [`ProviderBuilder`] (`Provider::class::<T>()`, `Provider::token::<T>(..)`);
//! - an [`Injectable`] implementation (static descriptor on the type);
//! - a [`Descriptor`] fetched from a
//!   [`DescriptorSource`](crate::application::ports::DescriptorSource).

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::lifecycle::{Lifecycle, LifecycleHooks, typed};
use crate::domain::scope::Scope;
use crate::domain::token::Token;

/// A resolved, type-erased instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Error type returned by factories and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased factory.
pub type FactoryFn = Arc<dyn Fn(&Dependencies) -> Result<Instance, BoxError> + Send + Sync>;

/// How a definition produces its instance.
#[derive(Clone)]
pub enum Activation {
    /// Call the factory with the resolved dependencies.
    Factory(FactoryFn),
    /// Hand out a value built outside the container.
    Value(Instance),
}

/// Dependency list and scope for a token, as supplied by a metadata layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Descriptor {
    pub dependencies: Vec<Token>,
    pub scope: Scope,
}

impl Descriptor {
    pub fn new(scope: Scope, dependencies: impl IntoIterator<Item = Token>) -> Self {
        Self {
            dependencies: dependencies.into_iter().collect(),
            scope,
        }
    }
}

/// An immutable provider definition.
#[derive(Clone)]
pub struct ProviderDefinition {
    token: Token,
    scope: Scope,
    dependencies: Vec<Token>,
    activation: Activation,
    hooks: Option<LifecycleHooks>,
    type_name: &'static str,
}

impl ProviderDefinition {
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Dependency tokens, in the order the factory receives them.
    pub fn dependencies(&self) -> &[Token] {
        &self.dependencies
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    pub fn hooks(&self) -> Option<&LifecycleHooks> {
        self.hooks.as_ref()
    }

    /// Name of the produced type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether this definition hands out a pre-built value.
    pub fn is_value(&self) -> bool {
        matches!(self.activation, Activation::Value(_))
    }
}

impl fmt::Debug for ProviderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDefinition")
            .field("token", &self.token)
            .field("scope", &self.scope)
            .field("dependencies", &self.dependencies)
            .field("value", &self.is_value())
            .field("hooks", &self.hooks)
            .field("type_name", &self.type_name)
            .finish()
    }
}

// ── Dependencies ────────────────────────────────────────────────────────────

/// Failure to pull a dependency out of [`Dependencies`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DependencyError {
    #[error("dependency '{token}' was not declared by this provider")]
    NotDeclared { token: Token },

    #[error("dependency at position {index} was not declared by this provider")]
    OutOfRange { index: usize },

    #[error("dependency '{token}' is not a {expected}")]
    WrongType { token: Token, expected: &'static str },
}

/// The resolved dependencies handed to a factory, in declared order.
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: Vec<(Token, Instance)>,
}

impl Dependencies {
    pub fn new(entries: Vec<(Token, Instance)>) -> Self {
        Self { entries }
    }

    /// Typed access by token.
    pub fn get<T: Send + Sync + 'static>(&self, token: &Token) -> Result<Arc<T>, DependencyError> {
        let instance = self
            .instance(token)
            .ok_or_else(|| DependencyError::NotDeclared {
                token: token.clone(),
            })?;
        downcast(token, instance)
    }

    /// Typed access by class token.
    pub fn of<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, DependencyError> {
        self.get(&Token::of::<T>())
    }

    /// Typed access by position.
    pub fn at<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>, DependencyError> {
        let (token, instance) = self
            .entries
            .get(index)
            .ok_or(DependencyError::OutOfRange { index })?;
        downcast(token, instance)
    }

    pub fn instance(&self, token: &Token) -> Option<&Instance> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == token)
            .map(|(_, instance)| instance)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, &Instance)> {
        self.entries.iter().map(|(token, instance)| (token, instance))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn downcast<T: Send + Sync + 'static>(
    token: &Token,
    instance: &Instance,
) -> Result<Arc<T>, DependencyError> {
    Arc::clone(instance)
        .downcast::<T>()
        .map_err(|_| DependencyError::WrongType {
            token: token.clone(),
            expected: std::any::type_name::<T>(),
        })
}

// ── Builders ────────────────────────────────────────────────────────────────

/// Static descriptor on a type: its token, dependencies, scope and constructor.
pub trait Injectable: Sized + Send + Sync + 'static {
    fn token() -> Token {
        Token::of::<Self>()
    }

    fn dependencies() -> Vec<Token> {
        Vec::new()
    }

    fn scope() -> Scope {
        Scope::Singleton
    }

    fn construct(deps: &Dependencies) -> Result<Self, BoxError>;
}

/// Entry points for building [`ProviderDefinition`]s.
pub struct Provider;

impl Provider {
    /// Provider of `T`, registered under `T`'s class token.
    pub fn class<T: Send + Sync + 'static>() -> ProviderBuilder<T> {
        ProviderBuilder::new(Token::of::<T>())
    }

    /// Provider of `T`, registered under an arbitrary token.
    pub fn token<T: Send + Sync + 'static>(token: impl Into<Token>) -> ProviderBuilder<T> {
        ProviderBuilder::new(token.into())
    }

    /// A value built outside the container. Always a singleton, never destroyed
    /// by the container.
    pub fn value<T: Send + Sync + 'static>(token: impl Into<Token>, value: T) -> ProviderDefinition {
        ProviderDefinition {
            token: token.into(),
            scope: Scope::Singleton,
            dependencies: Vec::new(),
            activation: Activation::Value(Arc::new(value)),
            hooks: None,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Provider from a type's [`Injectable`] descriptor.
    pub fn injectable<T: Injectable>() -> ProviderDefinition {
        ProviderBuilder::<T>::new(T::token())
            .scope(T::scope())
            .depends_on_all(T::dependencies())
            .construct(T::construct)
    }

    /// Like [`Provider::injectable`], with `T`'s [`Lifecycle`] hooks attached.
    pub fn injectable_with_lifecycle<T: Injectable + Lifecycle>() -> ProviderDefinition {
        ProviderBuilder::<T>::new(T::token())
            .scope(T::scope())
            .depends_on_all(T::dependencies())
            .with_lifecycle()
            .construct(T::construct)
    }
}

/// Builder for a provider producing `T`.
pub struct ProviderBuilder<T> {
    token: Token,
    scope: Scope,
    dependencies: Vec<Token>,
    hooks: LifecycleHooks,
    _product: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ProviderBuilder<T> {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            scope: Scope::default(),
            dependencies: Vec::new(),
            hooks: LifecycleHooks::new(),
            _product: PhantomData,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn singleton(self) -> Self {
        self.scope(Scope::Singleton)
    }

    pub fn transient(self) -> Self {
        self.scope(Scope::Transient)
    }

    pub fn request_scoped(self) -> Self {
        self.scope(Scope::Request)
    }

    /// Append one dependency. Order of calls is the order the factory sees.
    pub fn depends_on(mut self, token: impl Into<Token>) -> Self {
        self.dependencies.push(token.into());
        self
    }

    pub fn depends_on_all(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        self.dependencies.extend(tokens);
        self
    }

    /// Take scope and dependencies from a metadata descriptor.
    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.scope = descriptor.scope;
        self.dependencies = descriptor.dependencies;
        self
    }

    pub fn on_init(
        mut self,
        hook: impl Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks = self.hooks.with_init(typed::<T>(hook));
        self
    }

    pub fn on_destroy(
        mut self,
        hook: impl Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks = self.hooks.with_destroy(typed::<T>(hook));
        self
    }

    /// Finish with the constructor.
    pub fn construct<F, E>(self, factory: F) -> ProviderDefinition
    where
        F: Fn(&Dependencies) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let factory: FactoryFn = Arc::new(move |deps: &Dependencies| {
            factory(deps)
                .map(|value| Arc::new(value) as Instance)
                .map_err(Into::into)
        });

        ProviderDefinition {
            token: self.token,
            scope: self.scope,
            dependencies: self.dependencies,
            activation: Activation::Factory(factory),
            hooks: (!self.hooks.is_empty()).then_some(self.hooks),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl<T: Lifecycle> ProviderBuilder<T> {
    /// Attach `T`'s [`Lifecycle`] hooks after any `on_init`/`on_destroy`
    /// closures already on the builder.
    pub fn with_lifecycle(mut self) -> Self {
        self.hooks = self.hooks.then(LifecycleHooks::for_type::<T>());
        self
    }
}
