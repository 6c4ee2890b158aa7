use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// One raw constant pool entry.
///
/// Entries that refer to other entries hold the raw index instead of the
/// resolved value; resolution happens on lookup, so entries that legitimately
/// reference each other never need a materialized object graph.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

impl CpInfo {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class { .. } => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::FieldRef { .. } => "Fieldref",
            CpInfo::MethodRef { .. } => "Methodref",
            CpInfo::InterfaceMethodRef { .. } => "InterfaceMethodref",
            CpInfo::NameAndType { .. } => "NameAndType",
            CpInfo::MethodHandle { .. } => "MethodHandle",
            CpInfo::MethodType { .. } => "MethodType",
            CpInfo::Dynamic { .. } => "Dynamic",
            CpInfo::InvokeDynamic { .. } => "InvokeDynamic",
            CpInfo::Module { .. } => "Module",
            CpInfo::Package { .. } => "Package",
        }
    }
}

/// The classfile constant pool: a 1-indexed table of raw entries.
///
/// Index 0 is reserved and invalid. 8-byte entries (`Long`, `Double`) occupy
/// two consecutive slots and the second slot is unusable, per the format's
/// own numbering quirk.
#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    entries: Vec<Option<CpInfo>>,
}

impl ConstantPool {
    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let count = cursor.read_u2()? as usize;
        if count == 0 {
            return Err(Error::MalformedConstantPool {
                index: 0,
                detail: "constant pool count must be at least 1".to_string(),
            });
        }

        let mut entries = Vec::with_capacity(count);
        entries.push(None); // index 0 is reserved
        while entries.len() < count {
            let index = entries.len() as u16;
            let tag = cursor.read_u1()?;
            let info = match tag {
                1 => {
                    let len = cursor.read_u2()? as usize;
                    let bytes = cursor.read_bytes(len)?;
                    CpInfo::Utf8(decode_modified_utf8(bytes, index)?)
                }
                3 => CpInfo::Integer(cursor.read_u4()? as i32),
                4 => CpInfo::Float(f32::from_bits(cursor.read_u4()?)),
                5 => CpInfo::Long(cursor.read_u8()? as i64),
                6 => CpInfo::Double(f64::from_bits(cursor.read_u8()?)),
                7 => CpInfo::Class {
                    name_index: cursor.read_u2()?,
                },
                8 => CpInfo::String {
                    string_index: cursor.read_u2()?,
                },
                9 => CpInfo::FieldRef {
                    class_index: cursor.read_u2()?,
                    name_and_type_index: cursor.read_u2()?,
                },
                10 => CpInfo::MethodRef {
                    class_index: cursor.read_u2()?,
                    name_and_type_index: cursor.read_u2()?,
                },
                11 => CpInfo::InterfaceMethodRef {
                    class_index: cursor.read_u2()?,
                    name_and_type_index: cursor.read_u2()?,
                },
                12 => CpInfo::NameAndType {
                    name_index: cursor.read_u2()?,
                    descriptor_index: cursor.read_u2()?,
                },
                15 => CpInfo::MethodHandle {
                    reference_kind: cursor.read_u1()?,
                    reference_index: cursor.read_u2()?,
                },
                16 => CpInfo::MethodType {
                    descriptor_index: cursor.read_u2()?,
                },
                17 => CpInfo::Dynamic {
                    bootstrap_method_attr_index: cursor.read_u2()?,
                    name_and_type_index: cursor.read_u2()?,
                },
                18 => CpInfo::InvokeDynamic {
                    bootstrap_method_attr_index: cursor.read_u2()?,
                    name_and_type_index: cursor.read_u2()?,
                },
                19 => CpInfo::Module {
                    name_index: cursor.read_u2()?,
                },
                20 => CpInfo::Package {
                    name_index: cursor.read_u2()?,
                },
                other => {
                    return Err(Error::MalformedConstantPool {
                        index,
                        detail: format!("unknown tag {other}"),
                    })
                }
            };
            let wide = matches!(info, CpInfo::Long(_) | CpInfo::Double(_));
            entries.push(Some(info));
            if wide {
                entries.push(None);
            }
        }

        if entries.len() > count {
            return Err(Error::MalformedConstantPool {
                index: (count - 1) as u16,
                detail: "8-byte constant overruns the pool".to_string(),
            });
        }

        Ok(Self { entries })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&CpInfo> {
        match self.entries.get(index as usize) {
            Some(Some(info)) => Ok(info),
            Some(None) => Err(Error::MalformedConstantPool {
                index,
                detail: "unusable slot (index 0 or second half of an 8-byte constant)".to_string(),
            }),
            None => Err(Error::MalformedConstantPool {
                index,
                detail: "index out of range".to_string(),
            }),
        }
    }

    fn mismatch(&self, index: u16, expected: &str, found: &CpInfo) -> Error {
        Error::MalformedConstantPool {
            index,
            detail: format!("expected {expected}, found {}", found.kind()),
        }
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Utf8(text) => Ok(text),
            other => Err(self.mismatch(index, "Utf8", other)),
        }
    }

    /// Internal (slash-separated) name behind a `Class` entry.
    pub(crate) fn get_class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Class { name_index } => self.get_utf8(*name_index),
            other => Err(self.mismatch(index, "Class", other)),
        }
    }

    pub(crate) fn get_integer(&self, index: u16) -> Result<i32> {
        match self.get(index)? {
            CpInfo::Integer(value) => Ok(*value),
            other => Err(self.mismatch(index, "Integer", other)),
        }
    }

    pub(crate) fn get_long(&self, index: u16) -> Result<i64> {
        match self.get(index)? {
            CpInfo::Long(value) => Ok(*value),
            other => Err(self.mismatch(index, "Long", other)),
        }
    }

    pub(crate) fn get_float(&self, index: u16) -> Result<f32> {
        match self.get(index)? {
            CpInfo::Float(value) => Ok(*value),
            other => Err(self.mismatch(index, "Float", other)),
        }
    }

    pub(crate) fn get_double(&self, index: u16) -> Result<f64> {
        match self.get(index)? {
            CpInfo::Double(value) => Ok(*value),
            other => Err(self.mismatch(index, "Double", other)),
        }
    }

    /// `(name, descriptor)` behind a `NameAndType` entry.
    pub(crate) fn get_name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            CpInfo::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.get_utf8(*name_index)?, self.get_utf8(*descriptor_index)?)),
            other => Err(self.mismatch(index, "NameAndType", other)),
        }
    }
}

/// Decodes the modified UTF-8 of `Utf8` entries (JVMS 4.4.7): NUL is encoded
/// as the two-byte form `C0 80`, and supplementary characters as a CESU-8
/// surrogate pair of two 3-byte sequences.
fn decode_modified_utf8(bytes: &[u8], index: u16) -> Result<String> {
    let bad = || Error::MalformedConstantPool {
        index,
        detail: "invalid modified UTF-8".to_string(),
    };

    let continuation = |byte: Option<&u8>| -> Result<u32> {
        match byte {
            Some(&b) if b & 0xc0 == 0x80 => Ok(u32::from(b & 0x3f)),
            _ => Err(bad()),
        }
    };

    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let a = bytes[i];
        match a {
            0x01..=0x7f => {
                out.push(a as char);
                i += 1;
            }
            0xc0..=0xdf => {
                let b = continuation(bytes.get(i + 1))?;
                let cp = (u32::from(a & 0x1f) << 6) | b;
                out.push(char::from_u32(cp).ok_or_else(bad)?);
                i += 2;
            }
            0xe0..=0xef => {
                let b = continuation(bytes.get(i + 1))?;
                let c = continuation(bytes.get(i + 2))?;
                let cp = (u32::from(a & 0x0f) << 12) | (b << 6) | c;
                if (0xd800..=0xdbff).contains(&cp) {
                    // High surrogate: a 3-byte low surrogate must follow.
                    let d = *bytes.get(i + 3).ok_or_else(bad)?;
                    if d & 0xf0 != 0xe0 {
                        return Err(bad());
                    }
                    let e = continuation(bytes.get(i + 4))?;
                    let g = continuation(bytes.get(i + 5))?;
                    let low = (u32::from(d & 0x0f) << 12) | (e << 6) | g;
                    if !(0xdc00..=0xdfff).contains(&low) {
                        return Err(bad());
                    }
                    let cp = 0x10000 + ((cp - 0xd800) << 10) + (low - 0xdc00);
                    out.push(char::from_u32(cp).ok_or_else(bad)?);
                    i += 6;
                } else if (0xdc00..=0xdfff).contains(&cp) {
                    return Err(bad());
                } else {
                    out.push(char::from_u32(cp).ok_or_else(bad)?);
                    i += 3;
                }
            }
            _ => return Err(bad()),
        }
    }
    Ok(out)
}
