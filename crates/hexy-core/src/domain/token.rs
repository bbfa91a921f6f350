//! Registration keys.
//!
//! A [`Token`] is the opaque key a provider is registered under and a
//! dependency is requested by. Tokens compare by identity, never by the shape
//! of whatever they point at:
//!
//! - **Class** tokens are keyed by `TypeId` (`Token::of::<UserRepository>()`).
//! - **Named** tokens are keyed by their string (`Token::named("clock")`).
//! - **Symbol** tokens carry a fresh UUID, so two symbols created with the same
//!   description are still distinct keys.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Opaque identifier for a requestable dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// The provided type itself is the key.
    Class {
        type_id: TypeId,
        type_name: &'static str,
    },
    /// Human-chosen name, typically for interface-style contracts.
    Named(Arc<str>),
    /// Collision-proof marker for abstract contracts.
    Symbol { id: Uuid, description: Arc<str> },
}

impl Token {
    /// Class token for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Class {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// String token.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }

    /// A new symbolic token. Every call returns a key that no other token equals.
    pub fn symbol(description: impl Into<Arc<str>>) -> Self {
        Self::Symbol {
            id: Uuid::new_v4(),
            description: description.into(),
        }
    }

    /// The name used in diagnostics (short type name, string, or symbol description).
    pub fn label(&self) -> String {
        match self {
            Self::Class { type_name, .. } => short_type_name(type_name),
            Self::Named(name) => name.to_string(),
            Self::Symbol { description, .. } => format!("Symbol({description})"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<&Token> for Token {
    fn from(token: &Token) -> Self {
        token.clone()
    }
}

/// Render a path as `A -> B -> C`.
pub fn render_path(path: &[Token]) -> String {
    path.iter()
        .map(Token::label)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Strip module paths from a `std::any::type_name` string.
///
/// `alloc::sync::Arc<dyn app::Handler>` becomes `Arc<dyn Handler>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();

    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else if c == ':' {
            segment.clear();
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(&segment);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct UserRepository;

    #[test]
    fn class_tokens_compare_by_type() {
        assert_eq!(Token::of::<UserRepository>(), Token::of::<UserRepository>());
        assert_ne!(Token::of::<UserRepository>(), Token::of::<String>());
    }

    #[test]
    fn named_tokens_compare_by_name() {
        assert_eq!(Token::named("clock"), Token::from("clock"));
        assert_ne!(Token::named("clock"), Token::named("calendar"));
    }

    #[test]
    fn symbols_with_same_description_are_distinct() {
        let a = Token::symbol("Clock");
        let b = Token::symbol("Clock");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn named_and_symbol_never_collide() {
        assert_ne!(Token::named("Symbol(Clock)"), Token::symbol("Clock"));
    }

    #[test]
    fn class_label_is_short_name() {
        assert_eq!(Token::of::<UserRepository>().label(), "UserRepository");
        assert_eq!(
            short_type_name("alloc::sync::Arc<dyn app::ports::Handler>"),
            "Arc<dyn Handler>"
        );
    }

    #[test]
    fn renders_cycle_path() {
        let path = [
            Token::named("A"),
            Token::named("B"),
            Token::named("C"),
            Token::named("A"),
        ];
        assert_eq!(render_path(&path), "A -> B -> C -> A");
    }
}
