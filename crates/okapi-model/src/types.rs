use std::fmt;

use serde::{Deserialize, Serialize};

/// Dotted binary name of a class or primitive: `java.util.List`,
/// `com.example.Outer$Inner`, `int`. Nested classes keep the `$` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// From the constant pool's slash-separated internal form.
    pub fn from_internal(internal_name: &str) -> Self {
        Self(internal_name.replace('/', "."))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without the package prefix: `List`, `Outer$Inner`.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(dot) => &self.0[dot + 1..],
            None => &self.0,
        }
    }

    /// Empty for the default package and for primitives.
    pub fn package_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(dot) => &self.0[..dot],
            None => "",
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A Java type as it appears in the decoded model.
///
/// The variant set is closed on purpose: consumers match exhaustively, so a
/// new variant is a compile-visible breaking change everywhere it matters.
/// The `Display` rendering is a stable contract; it is handed across the
/// code-generation boundary as an opaque type string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JavaType {
    /// A raw class, interface or primitive reference.
    Basic(QualifiedName),
    Array(Box<JavaType>),
    /// A reference to a type parameter. The declaration lives in the
    /// enclosing scope chain, not here.
    Variable(String),
    Parameterized {
        raw: QualifiedName,
        arguments: Vec<JavaType>,
    },
    Wildcard {
        upper_bound: Option<Box<JavaType>>,
        lower_bound: Option<Box<JavaType>>,
    },
    Void,
}

impl JavaType {
    pub fn basic(name: impl Into<String>) -> Self {
        JavaType::Basic(QualifiedName::new(name))
    }

    pub fn array(element: JavaType) -> Self {
        JavaType::Array(Box::new(element))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        JavaType::Variable(name.into())
    }

    pub fn parameterized(raw: impl Into<String>, arguments: Vec<JavaType>) -> Self {
        JavaType::Parameterized {
            raw: QualifiedName::new(raw),
            arguments,
        }
    }

    pub fn wildcard_extends(upper_bound: JavaType) -> Self {
        JavaType::Wildcard {
            upper_bound: Some(Box::new(upper_bound)),
            lower_bound: None,
        }
    }

    pub fn wildcard_super(lower_bound: JavaType) -> Self {
        JavaType::Wildcard {
            upper_bound: None,
            lower_bound: Some(Box::new(lower_bound)),
        }
    }

    pub fn unbounded_wildcard() -> Self {
        JavaType::Wildcard {
            upper_bound: None,
            lower_bound: None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, JavaType::Void)
    }

    /// The raw class name behind this type, when there is one.
    pub fn non_generic_name(&self) -> Option<&QualifiedName> {
        match self {
            JavaType::Basic(name) => Some(name),
            JavaType::Parameterized { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Basic(name) => write!(f, "{name}"),
            JavaType::Array(element) => write!(f, "{element}[]"),
            JavaType::Variable(name) => f.write_str(name),
            JavaType::Parameterized { raw, arguments } => {
                write!(f, "{raw}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
            JavaType::Wildcard {
                upper_bound,
                lower_bound,
            } => match (upper_bound, lower_bound) {
                (_, Some(lower)) => write!(f, "? super {lower}"),
                (Some(upper), None) => write!(f, "? extends {upper}"),
                (None, None) => f.write_str("?"),
            },
            JavaType::Void => f.write_str("void"),
        }
    }
}
