//! kok - annotated service interfaces compiled into HTTP operations
//!
//! Describe each method of a service interface with a few comment
//! annotations and kok compiles them into backend-agnostic [`Operation`]s:
//!
//! ```text
//! // CreateProfile creates a profile.
//! // @kok(op): "POST /profiles"
//! // @kok(param): "profile"
//! // @kok(success): "statusCode=201"
//! ```
//!
//! The wire format of each operation is decided by a [`Codec`] looked up in
//! a [`CodecRegistry`]; the default [`JsonCodec`] writes failures as
//! `{"error": {"code": ..., "message": ...}}`. With the `openapi` feature the
//! same codecs document their own responses through a `Deriver`.
//!
//! # Quick Start
//!
//! ```
//! use kok::prelude::*;
//!
//! let source = r#"
//!     pub trait Service {
//!         /// GetProfile returns one profile.
//!         /// @kok(op): "GET /profiles/{id}"
//!         /// @kok(param): "id,in=path"
//!         fn get_profile(&self, id: String) -> Profile;
//!
//!         fn internal_only(&self);
//!     }
//! "#;
//!
//! let (iface, docs) = reflect_source(source, "Service")?;
//! let spec = compile(&iface, &docs)?;
//!
//! assert_eq!(spec.len(), 1);
//! let op = &spec.operations[0];
//! assert_eq!((op.method.as_str(), op.pattern.as_str()), ("GET", "/profiles/{id}"));
//! assert_eq!(op.param("id").map(|p| p.location), Some(Location::Path));
//! # Ok::<(), kok::CompileError>(())
//! ```
//!
//! # Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `kok-parse` | Param model, annotation DSL, compiler, trait reflection |
//! | `kok-core` | Codec contract, JSON codec, registry, error codes |
//! | `kok-openapi` | Response Deriver, OpenAPI generator and builder, doc config |

pub use kok_core::*;
pub use kok_parse::{
    Annotation, AnnotationError, CommentBlocks, CompileError, InterfaceDescription, Line, Location,
    MARKER, MEDIA_TYPE_JSON, Method, MethodParam, Operation, Options, Param, ParamDescriptor,
    ParamEdit, RawAnnotation, Specification, SuccessResponse, ValueError, compile,
    compile_method, default_required, extract_doc_lines, is_option_type, reflect_source,
    reflect_trait, scan_line, type_string,
};

#[cfg(feature = "openapi")]
pub use kok_openapi as openapi;

// Re-export serde for codec implementations
pub use serde;
pub use serde_json;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        Codec, CodecExt, CodecRegistry, CommentBlocks, Error, ErrorCode, InterfaceDescription,
        JsonCodec, Location, Method, Operation, Param, ResponseRecorder, ResponseWriter,
        Specification, compile, reflect_source,
    };

    #[cfg(feature = "openapi")]
    pub use kok_openapi::{Deriver, DocConfig, OpenApiGenerator, ResponseSchema};
}
