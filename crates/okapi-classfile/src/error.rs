use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while decoding one classfile.
///
/// All variants are terminal for the class being decoded; there is no
/// recovery mid-parse. Each carries enough context (byte offset, pool index
/// or the offending text) to pinpoint the failing construct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("not a class file: bad magic 0x{magic:08x}")]
    InvalidMagic { magic: u32 },

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedClassVersion { major: u16, minor: u16 },

    #[error("unexpected end of class file at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("trailing bytes after class file body at offset {offset}")]
    TrailingBytes { offset: usize },

    #[error("malformed constant pool entry {index}: {detail}")]
    MalformedConstantPool { index: u16, detail: String },

    #[error("malformed descriptor {descriptor:?} at offset {offset}")]
    MalformedDescriptor { descriptor: String, offset: usize },

    #[error("malformed signature {signature:?} at offset {offset}")]
    MalformedSignature { signature: String, offset: usize },

    #[error("malformed {attribute} attribute: {detail}")]
    MalformedAttribute {
        attribute: &'static str,
        detail: String,
    },
}
