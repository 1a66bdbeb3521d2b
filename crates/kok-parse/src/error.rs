//! Compile errors.

use thiserror::Error;

/// Errors that abort a compilation run.
///
/// Every variant names the offending method, and the line-level variants
/// carry the literal comment text so the annotation can be fixed directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A line mentions `@kok` but is not of the form `@kok(<key>): "<value>"`.
    #[error("invalid kok comment in method {method}: {comment}")]
    InvalidAnnotation { method: String, comment: String },

    /// The annotation key is not one of `op`, `param`, `success`, `failure`.
    #[error("unrecognized kok key \"{key}\" in method {method}, comment: {comment}")]
    UnknownKey {
        method: String,
        key: String,
        comment: String,
    },

    /// An `op` value does not split into exactly `<METHOD> <PATTERN>`.
    #[error(
        "{value:?} in method {method} does not match the expected format: \"<METHOD> <PATTERN>\" (comment: {comment})"
    )]
    MalformedOp {
        method: String,
        value: String,
        comment: String,
    },

    /// A `param` annotation refers to an argument the method does not have.
    #[error("no param `{param}` declared in the method {method} (comment: {comment})")]
    UndeclaredParam {
        method: String,
        param: String,
        comment: String,
    },

    /// A `param`, `success` or `failure` value could not be parsed.
    #[error("invalid {key} value {value:?} in method {method}: {reason} (comment: {comment})")]
    InvalidValue {
        method: String,
        key: String,
        value: String,
        reason: String,
        comment: String,
    },

    /// No `@kok(op)` annotation supplied the HTTP method.
    #[error("method {method} has no comment about @kok(op) providing the HTTP method")]
    MissingMethod { method: String },

    /// No `@kok(op)` annotation supplied the path pattern.
    #[error("method {method} has no comment about @kok(op) providing the path pattern")]
    MissingPattern { method: String },

    /// Two parameters of the same method share a name.
    #[error("duplicate param `{param}` in the method {method}")]
    DuplicateParam { method: String, param: String },

    /// The interface declaration could not be reflected.
    #[error("cannot reflect interface: {message}")]
    Reflect { message: String },
}

impl CompileError {
    /// Name of the method the error belongs to, if any.
    pub fn method(&self) -> Option<&str> {
        match self {
            CompileError::InvalidAnnotation { method, .. }
            | CompileError::UnknownKey { method, .. }
            | CompileError::MalformedOp { method, .. }
            | CompileError::UndeclaredParam { method, .. }
            | CompileError::InvalidValue { method, .. }
            | CompileError::MissingMethod { method }
            | CompileError::MissingPattern { method }
            | CompileError::DuplicateParam { method, .. } => Some(method),
            CompileError::Reflect { .. } => None,
        }
    }
}

/// Reason a single annotation value failed to parse.
///
/// Lifted into [`CompileError::InvalidValue`] once the method and comment
/// are known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValueError(pub String);

impl ValueError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<syn::Error> for CompileError {
    fn from(err: syn::Error) -> Self {
        CompileError::Reflect {
            message: err.to_string(),
        }
    }
}
