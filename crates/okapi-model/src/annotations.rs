use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::QualifiedName;

/// One annotation use: the annotation type's qualified name plus its named
/// attribute values, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaAnnotation {
    name: QualifiedName,
    attributes: IndexMap<String, AttributeValue>,
}

impl JavaAnnotation {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Normalized view of an attribute: absent yields an empty vec, an array
    /// yields its elements, anything else yields itself as the only element.
    /// A one-element array and a bare scalar are therefore indistinguishable
    /// here — a deliberate rule, matching how `value`-style attributes are
    /// consumed.
    pub fn attribute_values(&self, name: &str) -> Vec<&AttributeValue> {
        match self.attributes.get(name) {
            None => Vec::new(),
            Some(AttributeValue::Array(values)) => values.iter().collect(),
            Some(value) => vec![value],
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Value of one annotation attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// A class literal, rendered as the Java source form of the type
    /// (`java.lang.String`, `int`, `int[]`).
    ClassLiteral(QualifiedName),
    EnumConstant {
        enum_type: QualifiedName,
        constant: String,
    },
    Nested(Box<JavaAnnotation>),
    Array(Vec<AttributeValue>),
}

/// Renders `@name`, with a bare `(value)` shorthand when the only attribute
/// is the conventional `value` key, and `key=value` pairs joined by `", "`
/// otherwise. A one-element array renders as its sole element; a longer
/// array as a `{a,b,c}` list of the elements' raw forms.
impl fmt::Display for JavaAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;

        if self.attributes.len() == 1 {
            if let Some(value) = self.attributes.get("value") {
                f.write_str("(")?;
                write_value(f, value)?;
                return f.write_str(")");
            }
        }

        if !self.attributes.is_empty() {
            f.write_str("(")?;
            for (i, (name, value)) in self.attributes.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}=")?;
                write_value(f, value)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &AttributeValue) -> fmt::Result {
    match value {
        AttributeValue::Array(values) if values.len() == 1 => write_scalar(f, &values[0]),
        AttributeValue::Array(values) => write_raw_list(f, values),
        value => write_scalar(f, value),
    }
}

/// Scalar position: strings are quoted with embedded quotes escaped.
fn write_scalar(f: &mut fmt::Formatter<'_>, value: &AttributeValue) -> fmt::Result {
    match value {
        AttributeValue::String(text) => write!(f, "\"{}\"", text.replace('"', "\\\"")),
        value => write!(f, "{value}"),
    }
}

fn write_raw_list(f: &mut fmt::Formatter<'_>, values: &[AttributeValue]) -> fmt::Result {
    f.write_str("{")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("}")
}

/// The raw form: strings render unquoted here. Quoting only happens in
/// scalar attribute position, which is how the original renderer behaved.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Boolean(value) => write!(f, "{value}"),
            AttributeValue::Byte(value) => write!(f, "{value}"),
            AttributeValue::Char(value) => write!(f, "{value}"),
            AttributeValue::Short(value) => write!(f, "{value}"),
            AttributeValue::Int(value) => write!(f, "{value}"),
            AttributeValue::Long(value) => write!(f, "{value}"),
            AttributeValue::Float(value) => write!(f, "{value}"),
            AttributeValue::Double(value) => write!(f, "{value}"),
            AttributeValue::String(text) => f.write_str(text),
            AttributeValue::ClassLiteral(name) => write!(f, "{name}"),
            AttributeValue::EnumConstant { enum_type, constant } => {
                write!(f, "{enum_type}.{constant}")
            }
            AttributeValue::Nested(annotation) => write!(f, "{annotation}"),
            AttributeValue::Array(values) => write_raw_list(f, values),
        }
    }
}
