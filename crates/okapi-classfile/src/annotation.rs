use crate::constant_pool::ConstantPool;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// One decoded annotation: the annotation type's field descriptor plus the
/// named element values in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type (`Lcom/example/Endpoint;`).
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub(crate) fn parse(
        cursor: &mut Cursor<'_>,
        pool: &ConstantPool,
        attribute: &'static str,
    ) -> Result<Self> {
        let type_descriptor = pool.get_utf8(cursor.read_u2()?)?.to_string();
        let count = cursor.read_u2()? as usize;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let name = pool.get_utf8(cursor.read_u2()?)?.to_string();
            let value = ElementValue::parse(cursor, pool, attribute)?;
            elements.push((name, value));
        }
        Ok(Self {
            type_descriptor,
            elements,
        })
    }
}

/// One tagged element value. The tag byte picks the variant; scalar tags
/// copy the referenced constant pool literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        /// Field descriptor of the enum type.
        type_descriptor: String,
        const_name: String,
    },
    /// A class literal, as a field descriptor (or `V` for `void.class`).
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    fn parse(
        cursor: &mut Cursor<'_>,
        pool: &ConstantPool,
        attribute: &'static str,
    ) -> Result<Self> {
        let tag = cursor.read_u1()?;
        match tag {
            b'B' => Ok(ElementValue::Const(ConstValue::Byte(
                pool.get_integer(cursor.read_u2()?)? as i8,
            ))),
            b'C' => {
                let raw = pool.get_integer(cursor.read_u2()?)?;
                let value = char::from_u32(raw as u32).ok_or_else(|| Error::MalformedAttribute {
                    attribute,
                    detail: format!("invalid char constant {raw}"),
                })?;
                Ok(ElementValue::Const(ConstValue::Char(value)))
            }
            b'S' => Ok(ElementValue::Const(ConstValue::Short(
                pool.get_integer(cursor.read_u2()?)? as i16,
            ))),
            b'I' => Ok(ElementValue::Const(ConstValue::Int(
                pool.get_integer(cursor.read_u2()?)?,
            ))),
            b'Z' => Ok(ElementValue::Const(ConstValue::Boolean(
                pool.get_integer(cursor.read_u2()?)? != 0,
            ))),
            b'J' => Ok(ElementValue::Const(ConstValue::Long(
                pool.get_long(cursor.read_u2()?)?,
            ))),
            b'F' => Ok(ElementValue::Const(ConstValue::Float(
                pool.get_float(cursor.read_u2()?)?,
            ))),
            b'D' => Ok(ElementValue::Const(ConstValue::Double(
                pool.get_double(cursor.read_u2()?)?,
            ))),
            b's' => Ok(ElementValue::Const(ConstValue::String(
                pool.get_utf8(cursor.read_u2()?)?.to_string(),
            ))),
            b'e' => Ok(ElementValue::Enum {
                type_descriptor: pool.get_utf8(cursor.read_u2()?)?.to_string(),
                const_name: pool.get_utf8(cursor.read_u2()?)?.to_string(),
            }),
            b'c' => Ok(ElementValue::Class(
                pool.get_utf8(cursor.read_u2()?)?.to_string(),
            )),
            b'@' => Ok(ElementValue::Annotation(Box::new(Annotation::parse(
                cursor, pool, attribute,
            )?))),
            b'[' => {
                let count = cursor.read_u2()? as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(ElementValue::parse(cursor, pool, attribute)?);
                }
                Ok(ElementValue::Array(values))
            }
            other => Err(Error::MalformedAttribute {
                attribute,
                detail: format!("unknown element value tag {:?}", other as char),
            }),
        }
    }
}

/// A scalar constant copied out of the pool.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}
