//! Lowering from the classfile layer's descriptor and signature ASTs into
//! model types, with type variable resolution against the scope chain.

use std::cell::RefCell;

use indexmap::IndexMap;

use okapi_classfile::{
    ClassTypeSignature, ConstValue, ElementValue, FieldType, FieldTypeSignature, ReturnType,
    TypeArgument, TypeParameter, TypeSignature,
};
use okapi_model::{AttributeValue, JavaAnnotation, JavaType, QualifiedName, TypeSchema};

use crate::error::{Error, Result};

pub(crate) const OBJECT: &str = "java.lang.Object";

fn object() -> JavaType {
    JavaType::basic(OBJECT)
}

/// Type variables declared by the method currently being translated, when
/// there is one. Checked before the class scope so method parameters shadow
/// class parameters.
pub(crate) type MethodVariables<'a> = Option<&'a IndexMap<String, JavaType>>;

/// The scope chain of the class being assembled.
///
/// Lookup order is: method scope, the class's own parameters, an explicitly
/// supplied enclosing schema, then the synthetic enclosing scope. The
/// synthetic scope only exists for classes compiled out of a method body
/// (anonymous and local classes): their enclosing method's formal parameters
/// live in a different classfile, so undeclared variables are taken to be
/// declared there, with the root upper bound.
pub(crate) struct Scopes {
    class_name: QualifiedName,
    class_variables: IndexMap<String, JavaType>,
    explicit_parent: Option<TypeSchema>,
    implicit: RefCell<IndexMap<String, JavaType>>,
    allow_implicit: bool,
}

impl Scopes {
    pub(crate) fn new(
        class_name: QualifiedName,
        explicit_parent: Option<TypeSchema>,
        allow_implicit: bool,
    ) -> Self {
        Self {
            class_name,
            class_variables: IndexMap::new(),
            explicit_parent,
            implicit: RefCell::new(IndexMap::new()),
            allow_implicit,
        }
    }

    /// Declares a class-level type parameter name. Bounds are bound
    /// separately so they may reference any parameter, including the one
    /// being declared.
    pub(crate) fn declare_class_variable(&mut self, name: &str) {
        self.class_variables.insert(name.to_string(), object());
    }

    pub(crate) fn bind_class_variable(&mut self, name: &str, upper_bound: JavaType) {
        self.class_variables.insert(name.to_string(), upper_bound);
    }

    /// Checks that `name` is declared somewhere reachable, registering it in
    /// the synthetic enclosing scope when that is allowed.
    pub(crate) fn resolve_variable(
        &self,
        name: &str,
        method_variables: MethodVariables<'_>,
    ) -> Result<()> {
        let declared = method_variables.is_some_and(|variables| variables.contains_key(name))
            || self.class_variables.contains_key(name)
            || self
                .explicit_parent
                .as_ref()
                .is_some_and(|parent| parent.declares(name))
            || self.implicit.borrow().contains_key(name);
        if declared {
            return Ok(());
        }
        if self.allow_implicit {
            tracing::trace!(
                target: "okapi.reader",
                class = %self.class_name,
                variable = name,
                "declaring type variable in the synthetic enclosing scope"
            );
            self.implicit
                .borrow_mut()
                .insert(name.to_string(), object());
            return Ok(());
        }
        Err(Error::UnresolvedTypeVariable {
            name: name.to_string(),
            class: self.class_name.to_string(),
        })
    }

    /// Finalizes the class scope: own parameters on top of the explicit
    /// enclosing schema, or of the synthetic scope when one accumulated.
    pub(crate) fn into_schema(self) -> TypeSchema {
        let implicit = self.implicit.into_inner();
        let parent = match self.explicit_parent {
            Some(parent) => Some(parent),
            None if !implicit.is_empty() => {
                let mut synthetic = TypeSchema::new();
                for (name, upper_bound) in implicit {
                    synthetic.add(name, upper_bound);
                }
                Some(synthetic)
            }
            None => None,
        };

        let mut schema = match parent {
            Some(parent) => TypeSchema::with_parent(parent),
            None => TypeSchema::new(),
        };
        for (name, upper_bound) in self.class_variables {
            schema.add(name, upper_bound);
        }
        schema
    }
}

pub(crate) fn from_field_descriptor(descriptor: &FieldType) -> JavaType {
    match descriptor {
        FieldType::Base(base) => JavaType::basic(base.name()),
        FieldType::Object(internal_name) => {
            JavaType::Basic(QualifiedName::from_internal(internal_name))
        }
        FieldType::Array(element) => JavaType::array(from_field_descriptor(element)),
    }
}

pub(crate) fn from_return_descriptor(descriptor: &ReturnType) -> JavaType {
    match descriptor {
        ReturnType::Void => JavaType::Void,
        ReturnType::Type(ty) => from_field_descriptor(ty),
    }
}

pub(crate) fn from_type_signature(
    signature: &TypeSignature,
    scopes: &Scopes,
    method_variables: MethodVariables<'_>,
) -> Result<JavaType> {
    match signature {
        TypeSignature::Base(base) => Ok(JavaType::basic(base.name())),
        TypeSignature::Reference(reference) => {
            from_field_signature(reference, scopes, method_variables)
        }
    }
}

pub(crate) fn from_field_signature(
    signature: &FieldTypeSignature,
    scopes: &Scopes,
    method_variables: MethodVariables<'_>,
) -> Result<JavaType> {
    match signature {
        FieldTypeSignature::TypeVariable(name) => {
            scopes.resolve_variable(name, method_variables)?;
            Ok(JavaType::Variable(name.clone()))
        }
        FieldTypeSignature::Array(element) => Ok(JavaType::array(from_type_signature(
            element,
            scopes,
            method_variables,
        )?)),
        FieldTypeSignature::Class(class) => from_class_type(class, scopes, method_variables),
    }
}

/// Flattens a possibly nested class reference: `Outer<A>.Inner<B>` becomes
/// the raw name `Outer$Inner` with the argument list `[A, B]`, outer
/// arguments first. The model has no dedicated inner-class variant.
pub(crate) fn from_class_type(
    class: &ClassTypeSignature,
    scopes: &Scopes,
    method_variables: MethodVariables<'_>,
) -> Result<JavaType> {
    let mut raw = String::new();
    let mut arguments = Vec::new();
    for (i, segment) in class.segments.iter().enumerate() {
        if i == 0 {
            raw = segment.name.replace('/', ".");
        } else {
            raw.push('$');
            raw.push_str(&segment.name);
        }
        for argument in &segment.type_arguments {
            arguments.push(from_type_argument(argument, scopes, method_variables)?);
        }
    }

    if arguments.is_empty() {
        Ok(JavaType::Basic(QualifiedName::new(raw)))
    } else {
        Ok(JavaType::Parameterized {
            raw: QualifiedName::new(raw),
            arguments,
        })
    }
}

fn from_type_argument(
    argument: &TypeArgument,
    scopes: &Scopes,
    method_variables: MethodVariables<'_>,
) -> Result<JavaType> {
    match argument {
        TypeArgument::Unbounded => Ok(JavaType::unbounded_wildcard()),
        TypeArgument::Extends(bound) => Ok(JavaType::wildcard_extends(from_field_signature(
            bound,
            scopes,
            method_variables,
        )?)),
        TypeArgument::Super(bound) => Ok(JavaType::wildcard_super(from_field_signature(
            bound,
            scopes,
            method_variables,
        )?)),
        TypeArgument::Exact(ty) => from_field_signature(ty, scopes, method_variables),
    }
}

/// The declared upper bound stored in the schema: the class bound when
/// present, else the first interface bound, else the root type.
pub(crate) fn upper_bound(
    parameter: &TypeParameter,
    scopes: &Scopes,
    method_variables: MethodVariables<'_>,
) -> Result<JavaType> {
    match (&parameter.class_bound, parameter.interface_bounds.first()) {
        (Some(bound), _) => from_field_signature(bound, scopes, method_variables),
        (None, Some(bound)) => from_field_signature(bound, scopes, method_variables),
        (None, None) => Ok(object()),
    }
}

pub(crate) fn annotation_from_classfile(
    annotation: &okapi_classfile::Annotation,
) -> Result<JavaAnnotation> {
    let mut translated = JavaAnnotation::new(annotation_type_name(&annotation.type_descriptor)?);
    for (name, value) in &annotation.elements {
        translated.set_attribute(name.clone(), attribute_value(value)?);
    }
    Ok(translated)
}

fn annotation_type_name(descriptor: &str) -> Result<QualifiedName> {
    match okapi_classfile::parse_field_descriptor(descriptor)? {
        FieldType::Object(internal_name) => Ok(QualifiedName::from_internal(&internal_name)),
        _ => Err(Error::ClassFile(okapi_classfile::Error::MalformedAttribute {
            attribute: "annotation",
            detail: format!("annotation type is not a class: {descriptor}"),
        })),
    }
}

/// Class literals render as the Java source form of the type: `int`,
/// `java.lang.String`, `int[]`.
fn class_literal(descriptor: &str) -> Result<QualifiedName> {
    if descriptor == "V" {
        return Ok(QualifiedName::new("void"));
    }
    let ty = from_field_descriptor(&okapi_classfile::parse_field_descriptor(descriptor)?);
    Ok(QualifiedName::new(ty.to_string()))
}

fn attribute_value(value: &ElementValue) -> Result<AttributeValue> {
    match value {
        ElementValue::Const(constant) => Ok(match constant {
            ConstValue::Boolean(v) => AttributeValue::Boolean(*v),
            ConstValue::Byte(v) => AttributeValue::Byte(*v),
            ConstValue::Char(v) => AttributeValue::Char(*v),
            ConstValue::Short(v) => AttributeValue::Short(*v),
            ConstValue::Int(v) => AttributeValue::Int(*v),
            ConstValue::Long(v) => AttributeValue::Long(*v),
            ConstValue::Float(v) => AttributeValue::Float(*v),
            ConstValue::Double(v) => AttributeValue::Double(*v),
            ConstValue::String(v) => AttributeValue::String(v.clone()),
        }),
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => Ok(AttributeValue::EnumConstant {
            enum_type: annotation_type_name(type_descriptor)?,
            constant: const_name.clone(),
        }),
        ElementValue::Class(descriptor) => {
            Ok(AttributeValue::ClassLiteral(class_literal(descriptor)?))
        }
        ElementValue::Annotation(nested) => Ok(AttributeValue::Nested(Box::new(
            annotation_from_classfile(nested)?,
        ))),
        ElementValue::Array(values) => Ok(AttributeValue::Array(
            values.iter().map(attribute_value).collect::<Result<_>>()?,
        )),
    }
}
