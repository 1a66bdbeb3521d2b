//! The codec contract.
//!
//! A [`Codec`] decides how values cross the wire for one operation: how
//! request parameters and bodies are decoded on the server, how success and
//! failure responses are written, and the client-side mirror of each step.
//!
//! Values cross the trait as [`serde_json::Value`] so codecs can be used as
//! `dyn Codec`; [`CodecExt`] adds typed helpers on top.

use std::error::Error as StdError;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::error::Error;

/// Sink for an HTTP response.
///
/// Implemented by the transport layer for real responses and by
/// [`ResponseRecorder`] for in-memory capture.
pub trait ResponseWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap;
    fn write_status(&mut self, status: StatusCode);
    fn write_body(&mut self, body: &[u8]);
}

/// Records a response in memory.
#[derive(Debug, Clone, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Written status, 200 if none was written.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The `Content-Type` header, if set and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn into_response(self) -> Response<Vec<u8>> {
        let status = self.status();
        let mut resp = Response::new(self.body);
        *resp.status_mut() = status;
        *resp.headers_mut() = self.headers;
        resp
    }
}

impl ResponseWriter for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        // First status wins, as with a real response
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write_body(&mut self, body: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(body);
    }
}

/// Wire contract of one operation.
pub trait Codec: Send + Sync {
    // Server side.

    /// Decode a path, query or header parameter.
    ///
    /// Fails with an `INVALID_ARGUMENT` [`Error`] carrying the parse error.
    fn decode_request_param(&self, name: &str, value: &str) -> Result<Value>;

    /// Decode a request body; same failure condition as parameters.
    fn decode_request_body(&self, body: &[u8]) -> Result<Value>;

    /// Documentation representation of a success body.
    ///
    /// Codecs that wrap bodies (in an envelope, say) return the wrapped form.
    fn success_response(&self, body: &Value) -> Value {
        body.clone()
    }

    /// Write a success response, including at least a `Content-Type` header.
    fn encode_success_response(
        &self,
        w: &mut dyn ResponseWriter,
        status: StatusCode,
        body: &Value,
    ) -> Result<()>;

    /// Write a failure response for `err`.
    fn encode_failure_response(
        &self,
        w: &mut dyn ResponseWriter,
        err: &(dyn StdError + 'static),
    ) -> Result<()>;

    // Client side.

    fn encode_request_param(&self, name: &str, value: &Value) -> String;

    /// Encode a request body, returning bytes and the headers to send.
    fn encode_request_body(&self, body: &Value) -> Result<(Vec<u8>, HeaderMap)>;

    fn decode_success_response(&self, body: &[u8]) -> Result<Value>;

    /// Reconstruct the error carried by a failure response body.
    fn decode_failure_response(&self, body: &[u8]) -> Result<Error>;
}

/// Typed helpers over any [`Codec`].
pub trait CodecExt: Codec {
    /// Decode a parameter into `T`.
    ///
    /// A string that does not deserialize as-is is retried as a JSON
    /// literal, so `"42"` decodes into integers and `"true"` into booleans.
    fn decode_param<T: DeserializeOwned>(&self, name: &str, value: &str) -> Result<T> {
        let decoded = self.decode_request_param(name, value)?;
        match serde_json::from_value::<T>(decoded.clone()) {
            Ok(v) => Ok(v),
            Err(first) => match &decoded {
                Value::String(s) => serde_json::from_str::<T>(s)
                    .map_err(|_| Error::invalid_argument(format!("param {name}: {first}"))),
                _ => Err(Error::invalid_argument(format!("param {name}: {first}"))),
            },
        }
    }

    fn decode_body<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        let decoded = self.decode_request_body(body)?;
        serde_json::from_value(decoded).map_err(Error::invalid_argument)
    }

    fn encode_success<T: Serialize + ?Sized>(
        &self,
        w: &mut dyn ResponseWriter,
        status: StatusCode,
        body: &T,
    ) -> Result<()> {
        let value = serde_json::to_value(body).map_err(Error::internal)?;
        self.encode_success_response(w, status, &value)
    }

    fn encode_param<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<String> {
        let value = serde_json::to_value(value).map_err(Error::internal)?;
        Ok(self.encode_request_param(name, &value))
    }

    fn encode_body<T: Serialize + ?Sized>(&self, body: &T) -> Result<(Vec<u8>, HeaderMap)> {
        let value = serde_json::to_value(body).map_err(Error::internal)?;
        self.encode_request_body(&value)
    }

    fn decode_success<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        let decoded = self.decode_success_response(body)?;
        serde_json::from_value(decoded).map_err(Error::internal)
    }
}

impl<C: Codec + ?Sized> CodecExt for C {}

/// Set `Content-Type` on `headers`.
pub fn set_content_type(headers: &mut HeaderMap, content_type: &'static str) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
}
