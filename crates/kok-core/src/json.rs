//! Default JSON codec.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::Result;
use crate::codec::{Codec, ResponseWriter, set_content_type};
use crate::error::{BoxError, Error, ErrorCode, code_message_from_error, status_from_error};

/// Content type written by [`JsonCodec`].
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Maps an error to the status of its failure response.
pub type StatusLookup = Arc<dyn Fn(&(dyn StdError + 'static)) -> StatusCode + Send + Sync>;

/// Maps an error to the `(code, message)` of its failure envelope.
pub type CodeMessageLookup =
    Arc<dyn Fn(&(dyn StdError + 'static)) -> (String, String) + Send + Sync>;

/// Inner object of the failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Failure envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub error: ErrorResponse,
}

impl FailureResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorResponse {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Encodes and decodes a single named request parameter.
pub trait ParamCodec: Send + Sync {
    fn decode(&self, name: &str, value: &str) -> std::result::Result<Value, BoxError>;
    fn encode(&self, name: &str, value: &Value) -> String;
}

/// Plain string coercion: parameters decode to JSON strings and encode to
/// their textual form. Arrays encode as comma-separated lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainParamCodec;

impl ParamCodec for PlainParamCodec {
    fn decode(&self, _name: &str, value: &str) -> std::result::Result<Value, BoxError> {
        Ok(Value::String(value.to_string()))
    }

    fn encode(&self, name: &str, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| self.encode(name, item))
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        }
    }
}

/// JSON request/response codec with the canonical failure envelope.
///
/// # Example
///
/// ```
/// use kok_core::{Codec, Error, ErrorCode, JsonCodec, ResponseRecorder};
///
/// let codec = JsonCodec::new();
/// let mut rec = ResponseRecorder::new();
/// codec
///     .encode_failure_response(&mut rec, &Error::new(ErrorCode::NotFound, "no profile"))
///     .unwrap();
///
/// assert_eq!(rec.status().as_u16(), 404);
/// let err = codec.decode_failure_response(rec.body()).unwrap();
/// assert_eq!(err.code(), "NOT_FOUND");
/// ```
#[derive(Clone)]
pub struct JsonCodec {
    param_codecs: HashMap<String, Arc<dyn ParamCodec>>,
    default_param_codec: Arc<dyn ParamCodec>,
    status_lookup: StatusLookup,
    code_message_lookup: CodeMessageLookup,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JsonCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params: Vec<_> = self.param_codecs.keys().collect();
        params.sort();
        f.debug_struct("JsonCodec")
            .field("param_codecs", &params)
            .finish_non_exhaustive()
    }
}

impl JsonCodec {
    pub fn new() -> Self {
        Self {
            param_codecs: HashMap::new(),
            default_param_codec: Arc::new(PlainParamCodec),
            status_lookup: Arc::new(status_from_error),
            code_message_lookup: Arc::new(code_message_from_error),
        }
    }

    /// Use `codec` for the parameter `name`.
    pub fn with_param_codec(mut self, name: impl Into<String>, codec: impl ParamCodec + 'static) -> Self {
        self.param_codecs.insert(name.into(), Arc::new(codec));
        self
    }

    /// Use `codec` for parameters without their own codec.
    pub fn with_default_param_codec(mut self, codec: impl ParamCodec + 'static) -> Self {
        self.default_param_codec = Arc::new(codec);
        self
    }

    pub fn with_status_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&(dyn StdError + 'static)) -> StatusCode + Send + Sync + 'static,
    {
        self.status_lookup = Arc::new(lookup);
        self
    }

    pub fn with_code_message_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&(dyn StdError + 'static)) -> (String, String) + Send + Sync + 'static,
    {
        self.code_message_lookup = Arc::new(lookup);
        self
    }

    fn param_codec(&self, name: &str) -> &dyn ParamCodec {
        self.param_codecs
            .get(name)
            .map(|c| c.as_ref())
            .unwrap_or(self.default_param_codec.as_ref())
    }

    /// Status and envelope this codec produces for `err`.
    pub fn failure_for(&self, err: &(dyn StdError + 'static)) -> (StatusCode, FailureResponse) {
        let status = (self.status_lookup)(err);
        let (code, message) = (self.code_message_lookup)(err);
        (status, FailureResponse::new(code, message))
    }

    /// Serialize `body` as JSON into `w`.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        w: &mut dyn ResponseWriter,
        status: StatusCode,
        body: &T,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(body).map_err(Error::internal)?;
        set_content_type(w.headers_mut(), CONTENT_TYPE_JSON);
        w.write_status(status);
        w.write_body(&bytes);
        Ok(())
    }
}

impl Codec for JsonCodec {
    fn decode_request_param(&self, name: &str, value: &str) -> Result<Value> {
        self.param_codec(name)
            .decode(name, value)
            .map_err(|err| {
                Error::new(ErrorCode::InvalidArgument, format!("param {name}: {err}")).with_source(err)
            })
    }

    fn decode_request_body(&self, body: &[u8]) -> Result<Value> {
        serde_json::from_slice(body).map_err(Error::invalid_argument)
    }

    fn encode_success_response(
        &self,
        w: &mut dyn ResponseWriter,
        status: StatusCode,
        body: &Value,
    ) -> Result<()> {
        self.write_json(w, status, &self.success_response(body))
    }

    fn encode_failure_response(
        &self,
        w: &mut dyn ResponseWriter,
        err: &(dyn StdError + 'static),
    ) -> Result<()> {
        let (status, envelope) = self.failure_for(err);
        if status.is_server_error() {
            warn!(status = status.as_u16(), code = %envelope.error.code, error = %err, "failure response");
        }
        self.write_json(w, status, &envelope)
    }

    fn encode_request_param(&self, name: &str, value: &Value) -> String {
        self.param_codec(name).encode(name, value)
    }

    fn encode_request_body(&self, body: &Value) -> Result<(Vec<u8>, HeaderMap)> {
        let bytes = serde_json::to_vec(body).map_err(Error::internal)?;
        let mut headers = HeaderMap::new();
        set_content_type(&mut headers, CONTENT_TYPE_JSON);
        Ok((bytes, headers))
    }

    fn decode_success_response(&self, body: &[u8]) -> Result<Value> {
        serde_json::from_slice(body).map_err(Error::internal)
    }

    fn decode_failure_response(&self, body: &[u8]) -> Result<Error> {
        let resp: FailureResponse = serde_json::from_slice(body).map_err(Error::internal)?;
        Ok(Error::with_code(resp.error.code, resp.error.message))
    }
}
