//! Core wire types for kok.
//!
//! - [`Codec`]: how values and errors cross the wire for an operation
//! - [`JsonCodec`]: the default codec, with the failure envelope
//!   `{"error": {"code": ..., "message": ...}}`
//! - [`CodecRegistry`]: codec per operation name, with a default
//! - [`Error`] / [`ErrorCode`]: the error carried across the codec boundary

pub mod codec;
pub mod error;
pub mod json;
pub mod registry;

pub use codec::{Codec, CodecExt, ResponseRecorder, ResponseWriter, set_content_type};
pub use error::{
    BoxError, Error, ErrorCode, IntoErrorCode, code_message_from_error, status_from_error,
};
pub use json::{
    CONTENT_TYPE_JSON, CodeMessageLookup, ErrorResponse, FailureResponse, JsonCodec, ParamCodec,
    PlainParamCodec, StatusLookup,
};
pub use registry::CodecRegistry;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
