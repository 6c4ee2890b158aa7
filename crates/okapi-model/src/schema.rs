use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::JavaType;

/// The type parameters declared by one scope (a class or a method), each
/// mapped to its declared upper bound, in declaration order.
///
/// A nested scope holds a link to its enclosing scope; lookups walk the
/// chain outward, so an inner declaration shadows an outer one of the same
/// name. Scopes are immutable once assembly finishes — sharing happens by
/// cloning the chain, never by mutating it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    variables: IndexMap<String, JavaType>,
    parent: Option<Box<TypeSchema>>,
}

impl TypeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh scope nested inside `parent`.
    pub fn with_parent(parent: TypeSchema) -> Self {
        Self {
            variables: IndexMap::new(),
            parent: Some(Box::new(parent)),
        }
    }

    /// Declares a type parameter in this scope. Names are unique within one
    /// scope; redeclaring a name replaces its bound.
    pub fn add(&mut self, name: impl Into<String>, upper_bound: JavaType) {
        self.variables.insert(name.into(), upper_bound);
    }

    /// Upper bound of `name`, searching this scope first and then the
    /// enclosing chain.
    pub fn upper_bound(&self, name: &str) -> Option<&JavaType> {
        match self.variables.get(name) {
            Some(bound) => Some(bound),
            None => self.parent.as_deref().and_then(|parent| parent.upper_bound(name)),
        }
    }

    /// Whether `name` is declared anywhere in the scope chain.
    pub fn declares(&self, name: &str) -> bool {
        self.upper_bound(name).is_some()
    }

    /// Names declared by this scope itself, in declaration order.
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Whether this scope itself declares anything.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Number of parameters declared by this scope itself.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn parent(&self) -> Option<&TypeSchema> {
        self.parent.as_deref()
    }
}
