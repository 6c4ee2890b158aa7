#![forbid(unsafe_code)]

//! Assembles the semantic model of a single class from classfile bytes.
//!
//! The pipeline is a pure function from an immutable byte sequence to an
//! immutable [`JavaClass`]: no I/O, no shared state, no suspension points.
//! Reading many classes in parallel needs no coordination — run one
//! invocation per class file and collect the results.
//!
//! Per member, the mandatory erased descriptor is paired with the optional
//! generic signature; when a signature is present its types supersede the
//! descriptor's. Any failure aborts the whole class: a broken classfile
//! never yields a partially populated model.

mod error;
mod translate;

pub use crate::error::{Error, Result};

use indexmap::IndexMap;

use okapi_classfile::{
    parse_class_signature, parse_field_descriptor, parse_field_signature, parse_method_descriptor,
    parse_method_signature, ClassFile, Member, ThrowsSignature,
};
use okapi_model::{
    JavaAnnotation, JavaClass, JavaField, JavaMethod, JavaParameter, JavaType, QualifiedName,
    TypeSchema,
};

use crate::translate::Scopes;

/// Decodes one classfile byte sequence into a [`JavaClass`].
pub fn read_class(bytes: &[u8]) -> Result<JavaClass> {
    ClassMetadataReader::new().read(bytes)
}

/// Reader for one class, with optional context for nested classes whose
/// enclosing class has already been assembled.
#[derive(Debug, Clone, Default)]
pub struct ClassMetadataReader {
    enclosing_schema: Option<TypeSchema>,
}

impl ClassMetadataReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `schema` (the already assembled enclosing class's scope) as the
    /// parent scope for type variable resolution. With an explicit parent in
    /// place, the synthetic-enclosing-scope fallback for anonymous and local
    /// classes is disabled: what the parent does not declare is unresolved.
    pub fn with_enclosing_schema(schema: TypeSchema) -> Self {
        Self {
            enclosing_schema: Some(schema),
        }
    }

    pub fn read(&self, bytes: &[u8]) -> Result<JavaClass> {
        let class_file = ClassFile::parse(bytes)?;
        let name = QualifiedName::from_internal(&class_file.this_class);
        tracing::debug!(
            target: "okapi.reader",
            class = %name,
            major_version = class_file.major_version,
            "decoding class metadata"
        );

        let class_signature = match class_file.signature.as_deref() {
            Some(signature) => Some(parse_class_signature(signature)?),
            None => None,
        };

        let allow_implicit = self.enclosing_schema.is_none() && has_enclosing_scope(&class_file);
        let mut scopes = Scopes::new(name.clone(), self.enclosing_schema.clone(), allow_implicit);

        // Own schema: all names first, then bounds — a bound may reference
        // any parameter of the list, including the one it belongs to.
        if let Some(signature) = &class_signature {
            for parameter in &signature.type_parameters {
                scopes.declare_class_variable(&parameter.name);
            }
            let mut bounds = Vec::with_capacity(signature.type_parameters.len());
            for parameter in &signature.type_parameters {
                bounds.push(translate::upper_bound(parameter, &scopes, None)?);
            }
            for (parameter, bound) in signature.type_parameters.iter().zip(bounds) {
                scopes.bind_class_variable(&parameter.name, bound);
            }
        }

        // Supertypes: the signature's view wins when present.
        let (super_class, interfaces) = match &class_signature {
            Some(signature) => {
                let super_class =
                    Some(translate::from_class_type(&signature.super_class, &scopes, None)?);
                let interfaces = signature
                    .interfaces
                    .iter()
                    .map(|interface| translate::from_class_type(interface, &scopes, None))
                    .collect::<Result<Vec<_>>>()?;
                (super_class, interfaces)
            }
            None => (
                class_file
                    .super_class
                    .as_deref()
                    .map(|super_class| JavaType::Basic(QualifiedName::from_internal(super_class))),
                class_file
                    .interfaces
                    .iter()
                    .map(|interface| JavaType::Basic(QualifiedName::from_internal(interface)))
                    .collect(),
            ),
        };

        let mut fields = Vec::with_capacity(class_file.fields.len());
        for member in &class_file.fields {
            let ty = match member.signature.as_deref() {
                Some(signature) => {
                    let parsed = parse_field_signature(signature)?;
                    translate::from_field_signature(&parsed, &scopes, None)?
                }
                None => {
                    translate::from_field_descriptor(&parse_field_descriptor(&member.descriptor)?)
                }
            };
            fields.push(JavaField::new(
                member.name.clone(),
                member.access_flags,
                ty,
                member_annotations(member)?,
            ));
        }

        // Methods translate now but are constructed only after the scope
        // chain is final, so every method schema sees the full chain.
        let mut pending_methods = Vec::with_capacity(class_file.methods.len());
        for member in &class_file.methods {
            pending_methods.push(translate_method(member, &scopes)?);
        }

        let annotations = class_annotations(&class_file)?;

        let class_schema = scopes.into_schema();
        let methods = pending_methods
            .into_iter()
            .map(|pending| {
                let mut schema = TypeSchema::with_parent(class_schema.clone());
                for (variable, bound) in pending.variables {
                    schema.add(variable, bound);
                }
                JavaMethod::new(
                    pending.name,
                    pending.modifiers,
                    pending.return_type,
                    pending.parameters,
                    schema,
                    pending.annotations,
                )
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            target: "okapi.reader",
            class = %name,
            fields = fields.len(),
            methods = methods.len(),
            "assembled class model"
        );

        Ok(JavaClass::new(
            name,
            super_class,
            interfaces,
            class_file.access_flags,
            class_schema,
            fields,
            methods,
            annotations,
        ))
    }
}

/// Whether this class was compiled inside some enclosing scope: it carries
/// an `EnclosingMethod` attribute, or lists itself in `InnerClasses`.
fn has_enclosing_scope(class_file: &ClassFile) -> bool {
    class_file.enclosing_method.is_some()
        || class_file
            .inner_classes
            .iter()
            .any(|inner| inner.inner_class == class_file.this_class)
}

struct PendingMethod {
    name: String,
    modifiers: u16,
    return_type: JavaType,
    parameters: Vec<JavaParameter>,
    variables: Vec<(String, JavaType)>,
    annotations: Vec<JavaAnnotation>,
}

fn translate_method(member: &Member, scopes: &Scopes) -> Result<PendingMethod> {
    let descriptor = parse_method_descriptor(&member.descriptor)?;
    let signature = match member.signature.as_deref() {
        Some(signature) => Some(parse_method_signature(signature)?),
        None => None,
    };

    let mut method_variables: IndexMap<String, JavaType> = IndexMap::new();
    if let Some(signature) = &signature {
        for parameter in &signature.type_parameters {
            method_variables.insert(parameter.name.clone(), JavaType::basic(translate::OBJECT));
        }
        let mut bounds = Vec::with_capacity(signature.type_parameters.len());
        for parameter in &signature.type_parameters {
            bounds.push(translate::upper_bound(
                parameter,
                scopes,
                Some(&method_variables),
            )?);
        }
        for (parameter, bound) in signature.type_parameters.iter().zip(bounds) {
            method_variables.insert(parameter.name.clone(), bound);
        }
    }

    let (parameter_types, return_type) = match &signature {
        Some(signature) => {
            let mut types = Vec::with_capacity(signature.parameters.len());
            for parameter in &signature.parameters {
                types.push(translate::from_type_signature(
                    parameter,
                    scopes,
                    Some(&method_variables),
                )?);
            }
            let return_type = match &signature.return_type {
                Some(ty) => translate::from_type_signature(ty, scopes, Some(&method_variables))?,
                None => JavaType::Void,
            };
            // Throws clauses are not kept in the model, but an undeclared
            // variable there is still an input defect.
            for thrown in &signature.throws {
                if let ThrowsSignature::TypeVariable(variable) = thrown {
                    scopes.resolve_variable(variable, Some(&method_variables))?;
                }
            }
            (types, return_type)
        }
        None => (
            descriptor
                .parameters
                .iter()
                .map(translate::from_field_descriptor)
                .collect(),
            translate::from_return_descriptor(&descriptor.return_type),
        ),
    };

    let parameters = assemble_parameters(member, parameter_types)?;

    Ok(PendingMethod {
        name: member.name.clone(),
        modifiers: member.access_flags,
        return_type,
        parameters,
        variables: method_variables.into_iter().collect(),
        annotations: member_annotations(member)?,
    })
}

/// Attaches names and per-parameter annotations to the translated parameter
/// types. Groups shorter than the parameter list align to the trailing
/// parameters: compilers omit entries for leading synthetic parameters.
fn assemble_parameters(member: &Member, types: Vec<JavaType>) -> Result<Vec<JavaParameter>> {
    let count = types.len();
    let name_offset = count.saturating_sub(member.parameter_names.len());
    let visible_offset = count.saturating_sub(member.visible_parameter_annotations.len());
    let invisible_offset = count.saturating_sub(member.invisible_parameter_annotations.len());

    types
        .into_iter()
        .enumerate()
        .map(|(index, ty)| {
            let name = index
                .checked_sub(name_offset)
                .and_then(|i| member.parameter_names.get(i))
                .cloned()
                .flatten();

            let mut annotations = Vec::new();
            if let Some(group) = index
                .checked_sub(visible_offset)
                .and_then(|i| member.visible_parameter_annotations.get(i))
            {
                for annotation in group {
                    annotations.push(translate::annotation_from_classfile(annotation)?);
                }
            }
            if let Some(group) = index
                .checked_sub(invisible_offset)
                .and_then(|i| member.invisible_parameter_annotations.get(i))
            {
                for annotation in group {
                    annotations.push(translate::annotation_from_classfile(annotation)?);
                }
            }

            Ok(JavaParameter::new(name, ty, annotations))
        })
        .collect()
}

/// Visible annotations first, then invisible, each list in declaration
/// order.
fn member_annotations(member: &Member) -> Result<Vec<JavaAnnotation>> {
    member
        .visible_annotations
        .iter()
        .chain(&member.invisible_annotations)
        .map(translate::annotation_from_classfile)
        .collect()
}

fn class_annotations(class_file: &ClassFile) -> Result<Vec<JavaAnnotation>> {
    class_file
        .visible_annotations
        .iter()
        .chain(&class_file.invisible_annotations)
        .map(translate::annotation_from_classfile)
        .collect()
}
