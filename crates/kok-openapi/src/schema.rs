//! Response shapes observed through codecs.
//!
//! Documentation must show what actually goes over the wire, so the
//! [`Deriver`] never builds a response body on its own: it runs the
//! operation's codec against an in-memory [`ResponseRecorder`] and reports
//! what the codec wrote.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use kok_core::{Codec, CodecRegistry, ResponseRecorder};
use kok_parse::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;
use crate::error::OpenApiError;

/// A documented response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub content_type: String,
    /// Example body; `None` for binary and media content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Response {
    pub fn new(status_code: u16, content_type: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            status_code,
            content_type: content_type.into(),
            body,
        }
    }
}

/// Source of documented responses for operations.
pub trait ResponseSchema {
    /// Success response of operation `name` for an example `body`.
    fn success_response(&self, name: &str, status_code: u16, body: &Value) -> Result<Response>;

    /// Documented failure responses of operation `name`.
    fn failure_responses(&self, name: &str) -> Vec<Response>;

    /// Success response of a compiled operation, using its declared status.
    fn operation_response(&self, op: &Operation, body: &Value) -> Result<Response> {
        self.success_response(&op.name, op.success_response.status_code, body)
    }

    /// Documented failure responses of a compiled operation.
    fn operation_failures(&self, op: &Operation) -> Vec<Response> {
        self.failure_responses(&op.name)
    }
}

/// Enumerates failure responses per operation name.
pub type FailuresFn = Arc<dyn Fn(&str) -> Vec<Response> + Send + Sync>;

/// Enumerates the errors an operation documents.
pub type FailureErrorsFn = Arc<dyn Fn(&str) -> Vec<kok_core::Error> + Send + Sync>;

#[derive(Clone)]
enum Failures {
    Responses(FailuresFn),
    Errors(FailureErrorsFn),
}

/// [`ResponseSchema`] backed by a [`CodecRegistry`].
#[derive(Clone)]
pub struct Deriver {
    codecs: Arc<CodecRegistry>,
    failures: Option<Failures>,
}

impl fmt::Debug for Deriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deriver")
            .field("codecs", &self.codecs)
            .field("failures", &self.failures.is_some())
            .finish()
    }
}

impl Default for Deriver {
    fn default() -> Self {
        Self::new(Arc::new(CodecRegistry::new()))
    }
}

impl Deriver {
    pub fn new(codecs: Arc<CodecRegistry>) -> Self {
        Self {
            codecs,
            failures: None,
        }
    }

    /// Document failures with a custom enumeration function.
    pub fn with_failures<F>(mut self, failures: F) -> Self
    where
        F: Fn(&str) -> Vec<Response> + Send + Sync + 'static,
    {
        self.failures = Some(Failures::Responses(Arc::new(failures)));
        self
    }

    /// Document failures as the errors listed by `errors`, each encoded by
    /// the operation's failure codec.
    ///
    /// For compiled operations the failure encoder reference wins over the
    /// operation name, like the success side. Errors whose encoding fails
    /// are left out of the documentation.
    pub fn with_failure_errors<F>(mut self, errors: F) -> Self
    where
        F: Fn(&str) -> Vec<kok_core::Error> + Send + Sync + 'static,
    {
        self.failures = Some(Failures::Errors(Arc::new(errors)));
        self
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Failure response that the codec of `name` writes for `err`.
    pub fn failure_response(
        &self,
        name: &str,
        err: &(dyn StdError + 'static),
    ) -> Result<Response> {
        encode_failure(self.codecs.codec(name), err).map_err(|source| OpenApiError::Codec {
            operation: name.to_string(),
            source,
        })
    }

    fn failures(&self, name: &str, encoder: Option<&str>) -> Vec<Response> {
        match &self.failures {
            None => Vec::new(),
            Some(Failures::Responses(failures)) => failures(name),
            Some(Failures::Errors(errors)) => {
                let codec = self.codecs.resolve(name, encoder);
                errors(name)
                    .iter()
                    .filter_map(|err| match encode_failure(codec, err) {
                        Ok(resp) => Some(resp),
                        Err(source) => {
                            warn!(operation = name, error = %source, "failed to document failure");
                            None
                        }
                    })
                    .collect()
            }
        }
    }

    fn derive(
        &self,
        name: &str,
        codec: &dyn Codec,
        status_code: u16,
        body: &Value,
    ) -> Result<Response> {
        let status = StatusCode::from_u16(status_code)
            .ok()
            .filter(|_| (100..=599).contains(&status_code))
            .ok_or_else(|| OpenApiError::InvalidStatus {
                operation: name.to_string(),
                status: status_code,
            })?;

        let mut rec = ResponseRecorder::new();
        codec
            .encode_success_response(&mut rec, status, body)
            .map_err(|source| OpenApiError::Codec {
                operation: name.to_string(),
                source,
            })?;

        let content_type = rec.content_type().unwrap_or_default().to_string();
        let body = if is_media_type(&content_type) {
            None
        } else {
            Some(codec.success_response(body))
        };
        debug!(operation = name, content_type = %content_type, "derived success response");

        Ok(Response::new(status_code, content_type, body))
    }
}

impl ResponseSchema for Deriver {
    fn success_response(&self, name: &str, status_code: u16, body: &Value) -> Result<Response> {
        self.derive(name, self.codecs.codec(name), status_code, body)
    }

    fn failure_responses(&self, name: &str) -> Vec<Response> {
        self.failures(name, None)
    }

    /// Honors the operation's success encoder reference when one is
    /// registered.
    fn operation_response(&self, op: &Operation, body: &Value) -> Result<Response> {
        let codec = self
            .codecs
            .resolve(&op.name, op.success_response.encoder.as_deref());
        self.derive(&op.name, codec, op.success_response.status_code, body)
    }

    fn operation_failures(&self, op: &Operation) -> Vec<Response> {
        self.failures(&op.name, op.options.failure_encoder.as_deref())
    }
}

fn encode_failure(
    codec: &dyn Codec,
    err: &(dyn StdError + 'static),
) -> kok_core::Result<Response> {
    let mut rec = ResponseRecorder::new();
    codec.encode_failure_response(&mut rec, err)?;

    let content_type = rec.content_type().unwrap_or_default().to_string();
    let body = if is_media_type(&content_type) {
        None
    } else {
        Some(
            serde_json::from_slice(rec.body())
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(rec.body()).into_owned())),
        )
    };
    Ok(Response::new(rec.status().as_u16(), content_type, body))
}

/// Whether `content_type` denotes binary or media content.
///
/// Parameters such as `; charset=...` are ignored. An empty content type is
/// not media.
pub fn is_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let Some((top, sub)) = essence.split_once('/') else {
        return false;
    };
    match top {
        "image" | "audio" | "video" | "font" => true,
        "application" => matches!(sub, "octet-stream" | "pdf" | "zip" | "gzip"),
        _ => false,
    }
}
