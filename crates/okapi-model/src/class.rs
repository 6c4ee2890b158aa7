use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{JavaAnnotation, JavaType, QualifiedName, TypeSchema};

/// Access and property flags, as stored in the classfile.
pub mod modifiers {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const VOLATILE: u16 = 0x0040;
    pub const TRANSIENT: u16 = 0x0080;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

/// Raised by [`JavaClass::field`] for a name the class does not declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no such field `{field}` in class {class}")]
pub struct NoSuchField {
    pub class: QualifiedName,
    pub field: String,
}

/// Anything that can carry annotations.
pub trait Annotated {
    fn annotations(&self) -> &[JavaAnnotation];

    fn find_annotation(&self, name: &QualifiedName) -> Option<&JavaAnnotation> {
        self.annotations().iter().find(|a| a.name() == name)
    }

    fn has_annotation(&self, name: &QualifiedName) -> bool {
        self.find_annotation(name).is_some()
    }
}

/// Everything read about one class. Assembled bottom-up by the reader and
/// never mutated afterwards; share it by reference or clone freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaClass {
    name: QualifiedName,
    super_class: Option<JavaType>,
    interfaces: Vec<JavaType>,
    modifiers: u16,
    schema: TypeSchema,
    fields: Vec<JavaField>,
    methods: Vec<JavaMethod>,
    annotations: Vec<JavaAnnotation>,
}

impl JavaClass {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: QualifiedName,
        super_class: Option<JavaType>,
        interfaces: Vec<JavaType>,
        modifiers: u16,
        schema: TypeSchema,
        fields: Vec<JavaField>,
        methods: Vec<JavaMethod>,
        annotations: Vec<JavaAnnotation>,
    ) -> Self {
        Self {
            name,
            super_class,
            interfaces,
            modifiers,
            schema,
            fields,
            methods,
            annotations,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn super_class(&self) -> Option<&JavaType> {
        self.super_class.as_ref()
    }

    pub fn interfaces(&self) -> &[JavaType] {
        &self.interfaces
    }

    pub fn modifiers(&self) -> u16 {
        self.modifiers
    }

    /// The class's own type parameter scope. For nested and anonymous
    /// classes the scope links to the enclosing scopes via its parent chain.
    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn fields(&self) -> &[JavaField] {
        &self.fields
    }

    pub fn methods(&self) -> &[JavaMethod] {
        &self.methods
    }

    pub fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }

    pub fn field(&self, name: &str) -> Result<&JavaField, NoSuchField> {
        self.find_field(name).ok_or_else(|| NoSuchField {
            class: self.name.clone(),
            field: name.to_string(),
        })
    }

    pub fn find_field(&self, name: &str) -> Option<&JavaField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&JavaMethod> {
        self.methods.iter().find(|method| method.name() == name)
    }

    pub fn find_method_with_annotation(&self, annotation: &QualifiedName) -> Option<&JavaMethod> {
        self.methods.iter().find(|method| method.has_annotation(annotation))
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers & modifiers::INTERFACE != 0
    }

    pub fn is_annotation(&self) -> bool {
        self.modifiers & modifiers::ANNOTATION != 0
    }

    pub fn is_enum(&self) -> bool {
        self.modifiers & modifiers::ENUM != 0
    }

    /// Names of the enum constants, in declaration order. Empty for
    /// non-enum classes.
    pub fn enum_constants(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.is_enum_constant())
            .map(JavaField::name)
    }
}

impl Annotated for JavaClass {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

impl fmt::Display for JavaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One field, with its resolved (signature-aware) type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaField {
    name: String,
    modifiers: u16,
    ty: JavaType,
    annotations: Vec<JavaAnnotation>,
}

impl JavaField {
    pub fn new(name: String, modifiers: u16, ty: JavaType, annotations: Vec<JavaAnnotation>) -> Self {
        Self {
            name,
            modifiers,
            ty,
            annotations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modifiers(&self) -> u16 {
        self.modifiers
    }

    pub fn ty(&self) -> &JavaType {
        &self.ty
    }

    pub fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }

    pub fn is_public(&self) -> bool {
        self.modifiers & modifiers::PUBLIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.modifiers & modifiers::STATIC != 0
    }

    pub fn is_transient(&self) -> bool {
        self.modifiers & modifiers::TRANSIENT != 0
    }

    pub fn is_enum_constant(&self) -> bool {
        self.modifiers & modifiers::ENUM != 0
    }
}

impl Annotated for JavaField {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

/// One method, with signature-aware parameter and return types and its own
/// type parameter scope (parented by the class scope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaMethod {
    name: String,
    modifiers: u16,
    return_type: JavaType,
    parameters: Vec<JavaParameter>,
    schema: TypeSchema,
    annotations: Vec<JavaAnnotation>,
}

impl JavaMethod {
    pub fn new(
        name: String,
        modifiers: u16,
        return_type: JavaType,
        parameters: Vec<JavaParameter>,
        schema: TypeSchema,
        annotations: Vec<JavaAnnotation>,
    ) -> Self {
        Self {
            name,
            modifiers,
            return_type,
            parameters,
            schema,
            annotations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modifiers(&self) -> u16 {
        self.modifiers
    }

    pub fn return_type(&self) -> &JavaType {
        &self.return_type
    }

    pub fn parameters(&self) -> &[JavaParameter] {
        &self.parameters
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = &JavaType> {
        self.parameters.iter().map(JavaParameter::ty)
    }

    /// The method's own type parameter scope; its parent is the declaring
    /// class's scope.
    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }

    pub fn is_public(&self) -> bool {
        self.modifiers & modifiers::PUBLIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.modifiers & modifiers::STATIC != 0
    }

    /// A conventional JavaBean accessor: public, non-static, parameterless,
    /// non-void, named `getX` or `isX`.
    pub fn is_getter(&self) -> bool {
        self.is_public()
            && !self.is_static()
            && self.parameters.is_empty()
            && !self.return_type.is_void()
            && (matches!(self.name.strip_prefix("get"), Some(rest) if !rest.is_empty())
                || matches!(self.name.strip_prefix("is"), Some(rest) if !rest.is_empty()))
    }
}

impl Annotated for JavaMethod {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

/// One method parameter. The name is only present when the class was
/// compiled with parameter names retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaParameter {
    name: Option<String>,
    ty: JavaType,
    annotations: Vec<JavaAnnotation>,
}

impl JavaParameter {
    pub fn new(name: Option<String>, ty: JavaType, annotations: Vec<JavaAnnotation>) -> Self {
        Self {
            name,
            ty,
            annotations,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ty(&self) -> &JavaType {
        &self.ty
    }

    pub fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}

impl Annotated for JavaParameter {
    fn annotations(&self) -> &[JavaAnnotation] {
        &self.annotations
    }
}
