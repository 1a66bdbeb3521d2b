//! API documentation for kok services.
//!
//! Responses are documented by running each operation's codec, not by
//! guessing its output:
//!
//! ```
//! use std::sync::Arc;
//! use kok_core::CodecRegistry;
//! use kok_openapi::{Deriver, ResponseSchema};
//! use serde_json::json;
//!
//! let deriver = Deriver::new(Arc::new(CodecRegistry::new()));
//! let resp = deriver.success_response("GetProfile", 200, &json!({"id": "1"}))?;
//!
//! assert_eq!(resp.content_type, "application/json; charset=utf-8");
//! assert_eq!(resp.body, Some(json!({"id": "1"})));
//! # Ok::<(), kok_openapi::OpenApiError>(())
//! ```
//!
//! [`OpenApiGenerator`] turns a compiled [`Specification`](kok_parse::Specification)
//! into an OpenAPI 3.0 document; [`OpenApiBuilder`] merges documents.

mod builder;
mod config;
mod error;
mod generate;
mod schema;
mod types;

pub use builder::OpenApiBuilder;
pub use config::DocConfig;
pub use error::OpenApiError;
pub use generate::{OpenApiGenerator, infer_json_type, value_schema};
pub use schema::{Deriver, FailureErrorsFn, FailuresFn, Response, ResponseSchema, is_media_type};
pub use types::*;

/// Result type for documentation operations.
pub type Result<T> = std::result::Result<T, OpenApiError>;
