use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while assembling the model of one class.
///
/// Terminal for the class being read: a failing class yields no model at
/// all, so callers can distinguish "absent" from "broken".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    ClassFile(#[from] okapi_classfile::Error),

    /// A type variable reference with no declaration reachable from its use
    /// site's scope chain. This is an input defect, never a legal model
    /// state.
    #[error("unresolved type variable `{name}` in class {class}")]
    UnresolvedTypeVariable { name: String, class: String },
}
