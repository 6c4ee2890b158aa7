use crate::annotation::Annotation;
use crate::constant_pool::ConstantPool;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Oldest understood major version (JDK 1.1).
pub const MIN_MAJOR_VERSION: u16 = 45;
/// Newest understood major version (JDK 25). Anything newer must be
/// rejected, not guessed at.
pub const MAX_MAJOR_VERSION: u16 = 69;

/// A parsed classfile container, one step above the raw bytes: constant pool
/// indices are resolved to names and attribute payloads to structured data.
/// No semantic interpretation happens at this layer.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal (slash-separated) name.
    pub this_class: String,
    /// Absent only for `java/lang/Object` itself.
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    /// Raw generic signature, still unparsed at this layer.
    pub signature: Option<String>,
    pub visible_annotations: Vec<Annotation>,
    pub invisible_annotations: Vec<Annotation>,
    pub inner_classes: Vec<InnerClassInfo>,
    pub enclosing_method: Option<EnclosingMethod>,
}

/// One field or method as stored in the classfile.
#[derive(Debug, Clone)]
pub struct Member {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub visible_annotations: Vec<Annotation>,
    pub invisible_annotations: Vec<Annotation>,
    /// Per-parameter annotation groups (methods only). Compilers may emit
    /// fewer groups than descriptor parameters when leading parameters are
    /// synthetic.
    pub visible_parameter_annotations: Vec<Vec<Annotation>>,
    pub invisible_parameter_annotations: Vec<Vec<Annotation>>,
    /// Names from the `MethodParameters` attribute, when present.
    pub parameter_names: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    /// Absent for local and anonymous classes.
    pub outer_class: Option<String>,
    /// Source-level simple name; absent for anonymous classes.
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

/// The `EnclosingMethod` attribute of a local or anonymous class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethod {
    /// Internal name of the immediately enclosing class.
    pub class_name: String,
    /// `(name, descriptor)` of the enclosing method; absent when the class
    /// is not immediately enclosed in a method body.
    pub method: Option<(String, String)>,
}

impl ClassFile {
    /// Decodes one classfile. Any failure is terminal: no partially
    /// populated container is ever returned.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let magic = cursor.read_u4()?;
        if magic != 0xCAFE_BABE {
            return Err(Error::InvalidMagic { magic });
        }

        let minor_version = cursor.read_u2()?;
        let major_version = cursor.read_u2()?;
        if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major_version) {
            return Err(Error::UnsupportedClassVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        let pool = ConstantPool::parse(&mut cursor)?;

        let access_flags = cursor.read_u2()?;
        let this_class = pool.get_class_name(cursor.read_u2()?)?.to_string();
        let super_class_index = cursor.read_u2()?;
        let super_class = if super_class_index == 0 {
            None
        } else {
            Some(pool.get_class_name(super_class_index)?.to_string())
        };

        let interfaces_count = cursor.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(pool.get_class_name(cursor.read_u2()?)?.to_string());
        }

        let fields_count = cursor.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_member(&mut cursor, &pool)?);
        }

        let methods_count = cursor.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_member(&mut cursor, &pool)?);
        }

        let class_attributes = parse_attributes(&mut cursor, &pool, AttributeTarget::Class)?;

        cursor.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: class_attributes.signature,
            visible_annotations: class_attributes.visible_annotations,
            invisible_annotations: class_attributes.invisible_annotations,
            inner_classes: class_attributes.inner_classes,
            enclosing_method: class_attributes.enclosing_method,
        })
    }
}

fn parse_member(cursor: &mut Cursor<'_>, pool: &ConstantPool) -> Result<Member> {
    let access_flags = cursor.read_u2()?;
    let name = pool.get_utf8(cursor.read_u2()?)?.to_string();
    let descriptor = pool.get_utf8(cursor.read_u2()?)?.to_string();

    let attributes = parse_attributes(cursor, pool, AttributeTarget::Member)?;
    Ok(Member {
        access_flags,
        name,
        descriptor,
        signature: attributes.signature,
        visible_annotations: attributes.visible_annotations,
        invisible_annotations: attributes.invisible_annotations,
        visible_parameter_annotations: attributes.visible_parameter_annotations,
        invisible_parameter_annotations: attributes.invisible_parameter_annotations,
        parameter_names: attributes.parameter_names,
    })
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    visible_annotations: Vec<Annotation>,
    invisible_annotations: Vec<Annotation>,
    inner_classes: Vec<InnerClassInfo>,
    enclosing_method: Option<EnclosingMethod>,
    visible_parameter_annotations: Vec<Vec<Annotation>>,
    invisible_parameter_annotations: Vec<Vec<Annotation>>,
    parameter_names: Vec<Option<String>>,
}

enum AttributeTarget {
    Class,
    Member,
}

fn parse_attributes(
    cursor: &mut Cursor<'_>,
    pool: &ConstantPool,
    target: AttributeTarget,
) -> Result<ParsedAttributes> {
    let attributes_count = cursor.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name_index = cursor.read_u2()?;
        let length = cursor.read_u4()? as usize;
        let payload = cursor.read_bytes(length)?;
        let name = pool.get_utf8(name_index)?;

        let mut sub = Cursor::new(payload);
        match (name, &target) {
            ("Signature", _) => {
                parsed.signature = Some(pool.get_utf8(sub.read_u2()?)?.to_string());
                finish_attribute(&sub, "Signature")?;
            }
            ("RuntimeVisibleAnnotations", _) => {
                parsed.visible_annotations =
                    parse_annotation_list(&mut sub, pool, "RuntimeVisibleAnnotations")?;
                finish_attribute(&sub, "RuntimeVisibleAnnotations")?;
            }
            ("RuntimeInvisibleAnnotations", _) => {
                parsed.invisible_annotations =
                    parse_annotation_list(&mut sub, pool, "RuntimeInvisibleAnnotations")?;
                finish_attribute(&sub, "RuntimeInvisibleAnnotations")?;
            }
            ("RuntimeVisibleParameterAnnotations", AttributeTarget::Member) => {
                parsed.visible_parameter_annotations = parse_parameter_annotations(
                    &mut sub,
                    pool,
                    "RuntimeVisibleParameterAnnotations",
                )?;
                finish_attribute(&sub, "RuntimeVisibleParameterAnnotations")?;
            }
            ("RuntimeInvisibleParameterAnnotations", AttributeTarget::Member) => {
                parsed.invisible_parameter_annotations = parse_parameter_annotations(
                    &mut sub,
                    pool,
                    "RuntimeInvisibleParameterAnnotations",
                )?;
                finish_attribute(&sub, "RuntimeInvisibleParameterAnnotations")?;
            }
            ("MethodParameters", AttributeTarget::Member) => {
                let count = sub.read_u1()? as usize;
                let mut names = Vec::with_capacity(count);
                for _ in 0..count {
                    let name_index = sub.read_u2()?;
                    let _parameter_flags = sub.read_u2()?;
                    names.push(if name_index == 0 {
                        None
                    } else {
                        Some(pool.get_utf8(name_index)?.to_string())
                    });
                }
                parsed.parameter_names = names;
                finish_attribute(&sub, "MethodParameters")?;
            }
            ("InnerClasses", AttributeTarget::Class) => {
                let count = sub.read_u2()? as usize;
                let mut inner_classes = Vec::with_capacity(count);
                for _ in 0..count {
                    let inner_index = sub.read_u2()?;
                    let outer_index = sub.read_u2()?;
                    let name_index = sub.read_u2()?;
                    let inner_flags = sub.read_u2()?;

                    inner_classes.push(InnerClassInfo {
                        inner_class: pool.get_class_name(inner_index)?.to_string(),
                        outer_class: if outer_index == 0 {
                            None
                        } else {
                            Some(pool.get_class_name(outer_index)?.to_string())
                        },
                        inner_name: if name_index == 0 {
                            None
                        } else {
                            Some(pool.get_utf8(name_index)?.to_string())
                        },
                        access_flags: inner_flags,
                    });
                }
                parsed.inner_classes = inner_classes;
                finish_attribute(&sub, "InnerClasses")?;
            }
            ("EnclosingMethod", AttributeTarget::Class) => {
                let class_index = sub.read_u2()?;
                let method_index = sub.read_u2()?;
                let method = if method_index == 0 {
                    None
                } else {
                    let (name, descriptor) = pool.get_name_and_type(method_index)?;
                    Some((name.to_string(), descriptor.to_string()))
                };
                parsed.enclosing_method = Some(EnclosingMethod {
                    class_name: pool.get_class_name(class_index)?.to_string(),
                    method,
                });
                finish_attribute(&sub, "EnclosingMethod")?;
            }
            _ => {
                // Unknown attribute: intentionally skipped.
            }
        }
    }

    Ok(parsed)
}

fn parse_annotation_list(
    cursor: &mut Cursor<'_>,
    pool: &ConstantPool,
    attribute: &'static str,
) -> Result<Vec<Annotation>> {
    let count = cursor.read_u2()? as usize;
    let mut annotations = Vec::with_capacity(count);
    for _ in 0..count {
        annotations.push(Annotation::parse(cursor, pool, attribute)?);
    }
    Ok(annotations)
}

fn parse_parameter_annotations(
    cursor: &mut Cursor<'_>,
    pool: &ConstantPool,
    attribute: &'static str,
) -> Result<Vec<Vec<Annotation>>> {
    let group_count = cursor.read_u1()? as usize;
    let mut groups = Vec::with_capacity(group_count);
    for _ in 0..group_count {
        groups.push(parse_annotation_list(cursor, pool, attribute)?);
    }
    Ok(groups)
}

fn finish_attribute(cursor: &Cursor<'_>, attribute: &'static str) -> Result<()> {
    if cursor.remaining() == 0 {
        Ok(())
    } else {
        Err(Error::MalformedAttribute {
            attribute,
            detail: format!("{} trailing bytes", cursor.remaining()),
        })
    }
}
