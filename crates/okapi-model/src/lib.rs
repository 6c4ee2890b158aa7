#![forbid(unsafe_code)]

//! The semantic model of a compiled Java class: generics-aware types, type
//! parameter scopes, members and declaration annotations.
//!
//! Values here are produced once by `okapi-reader` and shared immutably with
//! every downstream consumer; nothing in this crate mutates after assembly.

mod annotations;
mod class;
mod schema;
mod types;

pub use crate::annotations::{AttributeValue, JavaAnnotation};
pub use crate::class::{
    modifiers, Annotated, JavaClass, JavaField, JavaMethod, JavaParameter, NoSuchField,
};
pub use crate::schema::TypeSchema;
pub use crate::types::{JavaType, QualifiedName};
