use crate::descriptor::BaseType;
use crate::error::{Error, Result};

/// Parsed `Signature` attribute of a generic class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

/// Parsed `Signature` attribute of a generic method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<ThrowsSignature>,
}

/// A formal type parameter declaration with its bounds.
///
/// The class bound may be absent (`<T::Ljava/io/Serializable;>` declares only
/// an interface bound); absent bounds do not imply an explicit
/// `java/lang/Object` entry here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<FieldTypeSignature>,
    pub interface_bounds: Vec<FieldTypeSignature>,
}

/// Any type position in a signature: a primitive or a reference type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Reference(FieldTypeSignature),
}

/// A reference type in a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeSignature {
    Class(ClassTypeSignature),
    Array(Box<TypeSignature>),
    TypeVariable(String),
}

/// A (possibly nested) class reference with type arguments per segment.
///
/// `Lcom/example/Outer<TT;>.Inner<TU;>;` parses into two segments. The first
/// segment's name carries the slash-qualified binary prefix; later segments
/// are the simple names of member classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    pub segments: Vec<ClassTypeSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSegment {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

/// One argument inside `<...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Unbounded,
    /// `+X`, an upper-bounded wildcard.
    Extends(FieldTypeSignature),
    /// `-X`, a lower-bounded wildcard.
    Super(FieldTypeSignature),
    Exact(FieldTypeSignature),
}

/// One entry of a method's `throws` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrowsSignature {
    Class(ClassTypeSignature),
    TypeVariable(String),
}

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature> {
    let mut parser = SignatureParser::new(signature);
    let type_parameters = parser.type_parameters_opt()?;
    let super_class = parser.class_type_signature()?;
    let mut interfaces = Vec::new();
    while !parser.at_end() {
        interfaces.push(parser.class_type_signature()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature> {
    let mut parser = SignatureParser::new(signature);
    let type_parameters = parser.type_parameters_opt()?;
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while !parser.at(b')') {
        parameters.push(parser.type_signature()?);
    }
    parser.expect(b')')?;
    let return_type = if parser.at(b'V') {
        parser.bump();
        None
    } else {
        Some(parser.type_signature()?)
    };
    let mut throws = Vec::new();
    while parser.at(b'^') {
        parser.bump();
        throws.push(if parser.at(b'T') {
            ThrowsSignature::TypeVariable(parser.type_variable()?)
        } else {
            ThrowsSignature::Class(parser.class_type_signature()?)
        });
    }
    parser.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(signature: &str) -> Result<FieldTypeSignature> {
    let mut parser = SignatureParser::new(signature);
    let ty = parser.field_type_signature()?;
    parser.finish()?;
    Ok(ty)
}

/// Recursive descent over JVMS 4.7.9.1. Depth is bounded by the nesting of
/// generic type arguments in the compiled source.
struct SignatureParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at(&self, byte: u8) -> bool {
        self.peek() == Some(byte)
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.at(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn error(&self) -> Error {
        Error::MalformedSignature {
            signature: self.input.to_string(),
            offset: self.pos,
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// One identifier: a non-empty run of bytes excluding the grammar's
    /// delimiter set.
    fn identifier(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b'.' | b';' | b'[' | b'/' | b'<' | b'>' | b':') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(&self.input[start..self.pos])
    }

    /// Slash-separated binary name prefix, up to the next `<`, `.` or `;`.
    fn qualified_name(&mut self) -> Result<String> {
        let mut name = String::from(self.identifier()?);
        while self.at(b'/') {
            self.bump();
            name.push('/');
            name.push_str(self.identifier()?);
        }
        Ok(name)
    }

    fn type_parameters_opt(&mut self) -> Result<Vec<TypeParameter>> {
        if !self.at(b'<') {
            return Ok(Vec::new());
        }
        self.bump();
        if self.at(b'>') {
            return Err(self.error());
        }
        let mut parameters = Vec::new();
        while !self.at(b'>') {
            parameters.push(self.type_parameter()?);
        }
        self.expect(b'>')?;
        Ok(parameters)
    }

    fn type_parameter(&mut self) -> Result<TypeParameter> {
        let name = self.identifier()?.to_string();
        self.expect(b':')?;
        let class_bound = if self.at(b':') {
            None
        } else {
            Some(self.field_type_signature()?)
        };
        let mut interface_bounds = Vec::new();
        while self.at(b':') {
            self.bump();
            interface_bounds.push(self.field_type_signature()?);
        }
        Ok(TypeParameter {
            name,
            class_bound,
            interface_bounds,
        })
    }

    fn type_signature(&mut self) -> Result<TypeSignature> {
        if let Some(tag) = self.peek() {
            if let Some(base) = BaseType::from_tag(tag) {
                self.bump();
                return Ok(TypeSignature::Base(base));
            }
        }
        Ok(TypeSignature::Reference(self.field_type_signature()?))
    }

    fn field_type_signature(&mut self) -> Result<FieldTypeSignature> {
        match self.peek() {
            Some(b'L') => Ok(FieldTypeSignature::Class(self.class_type_signature()?)),
            Some(b'[') => {
                self.bump();
                Ok(FieldTypeSignature::Array(Box::new(self.type_signature()?)))
            }
            Some(b'T') => Ok(FieldTypeSignature::TypeVariable(self.type_variable()?)),
            _ => Err(self.error()),
        }
    }

    fn type_variable(&mut self) -> Result<String> {
        self.expect(b'T')?;
        let name = self.identifier()?.to_string();
        self.expect(b';')?;
        Ok(name)
    }

    fn class_type_signature(&mut self) -> Result<ClassTypeSignature> {
        self.expect(b'L')?;
        let mut segments = Vec::new();
        let name = self.qualified_name()?;
        let type_arguments = self.type_arguments_opt()?;
        segments.push(ClassTypeSegment {
            name,
            type_arguments,
        });
        while self.at(b'.') {
            self.bump();
            let name = self.identifier()?.to_string();
            let type_arguments = self.type_arguments_opt()?;
            segments.push(ClassTypeSegment {
                name,
                type_arguments,
            });
        }
        self.expect(b';')?;
        Ok(ClassTypeSignature { segments })
    }

    fn type_arguments_opt(&mut self) -> Result<Vec<TypeArgument>> {
        if !self.at(b'<') {
            return Ok(Vec::new());
        }
        self.bump();
        if self.at(b'>') {
            return Err(self.error());
        }
        let mut arguments = Vec::new();
        while !self.at(b'>') {
            arguments.push(self.type_argument()?);
        }
        self.expect(b'>')?;
        Ok(arguments)
    }

    fn type_argument(&mut self) -> Result<TypeArgument> {
        match self.peek() {
            Some(b'*') => {
                self.bump();
                Ok(TypeArgument::Unbounded)
            }
            Some(b'+') => {
                self.bump();
                Ok(TypeArgument::Extends(self.field_type_signature()?))
            }
            Some(b'-') => {
                self.bump();
                Ok(TypeArgument::Super(self.field_type_signature()?))
            }
            _ => Ok(TypeArgument::Exact(self.field_type_signature()?)),
        }
    }
}
