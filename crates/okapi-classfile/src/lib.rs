#![forbid(unsafe_code)]

//! Read-only decoder for the JVM classfile container format.
//!
//! This crate stops at the structural layer: it resolves constant pool
//! indices, splits attributes, and parses the descriptor and generic
//! signature grammars into ASTs. Turning those into a semantic class model
//! is the job of `okapi-reader`.

mod annotation;
mod classfile;
mod constant_pool;
mod cursor;
mod descriptor;
mod error;
mod signature;

pub use crate::annotation::{Annotation, ConstValue, ElementValue};
pub use crate::classfile::{
    ClassFile, EnclosingMethod, InnerClassInfo, Member, MAX_MAJOR_VERSION, MIN_MAJOR_VERSION,
};
pub use crate::descriptor::{
    parse_field_descriptor, parse_method_descriptor, BaseType, FieldType, MethodDescriptor,
    ReturnType,
};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSegment, ClassTypeSignature, FieldTypeSignature, MethodSignature, ThrowsSignature,
    TypeArgument, TypeParameter, TypeSignature,
};
