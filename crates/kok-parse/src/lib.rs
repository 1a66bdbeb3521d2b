//! Annotation compiler for kok.
//!
//! Turns an interface description plus `@kok(...)` comment annotations into
//! a [`Specification`]: an ordered list of HTTP [`Operation`]s with verb,
//! path pattern, parameter placement and response shape.
//!
//! # Annotations
//!
//! ```text
//! // GetProfile returns the profile with the given ID.
//! // @kok(op): "GET /profiles/{id}"
//! // @kok(param): "id,in=path"
//! // @kok(param): "filter.tags,in=query,name=tag"
//! // @kok(success): "statusCode=200,mediaType=application/json"
//! // @kok(failure): "encoder=problem"
//! ```
//!
//! Lines that do not mention `@kok` are prose and end up in
//! [`Operation::description`].

mod annotation;
mod compile;
mod error;
mod interface;
mod operation;
mod param;
mod reflect;

pub use annotation::{Annotation, AnnotationError, Line, MARKER, RawAnnotation, scan_line};
pub use compile::{compile, compile_method};
pub use error::{CompileError, ValueError};
pub use interface::{CommentBlocks, InterfaceDescription, Method, MethodParam};
pub use operation::{MEDIA_TYPE_JSON, Operation, Options, Specification, SuccessResponse};
pub use param::{Location, Param, ParamDescriptor, ParamEdit, default_required, is_option_type};
pub use reflect::{extract_doc_lines, reflect_source, reflect_trait, type_string};

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
