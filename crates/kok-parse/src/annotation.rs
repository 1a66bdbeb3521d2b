//! The `@kok(<key>): "<value>"` comment DSL.
//!
//! A comment line takes part in the DSL only if it mentions `@kok`. Such a
//! line must then match the annotation form exactly once; anything else is an
//! error rather than prose.

use crate::error::ValueError;
use crate::operation::{MEDIA_TYPE_JSON, SuccessResponse};
use crate::param::{ParamDescriptor, ParamEdit};

/// Marker that turns a comment line into an annotation.
pub const MARKER: &str = "@kok";

/// A `(key, value)` pair lifted out of one comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAnnotation<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Outcome of scanning a single comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Free-form documentation.
    Prose,
    Annotation(RawAnnotation<'a>),
    /// Mentions `@kok` but is not a well-formed annotation.
    Invalid,
}

/// Scan one comment line.
pub fn scan_line(line: &str) -> Line<'_> {
    let Some(start) = line.find(MARKER) else {
        return Line::Prose;
    };

    // Later occurrences get a chance if the first is, e.g., inside prose.
    let mut rest = &line[start..];
    loop {
        if let Some(raw) = match_annotation(rest) {
            return Line::Annotation(raw);
        }
        match rest[MARKER.len()..].find(MARKER) {
            Some(next) => rest = &rest[MARKER.len() + next..],
            None => return Line::Invalid,
        }
    }
}

/// Match `@kok(<word>):<ws>"<value>"` at the start of `text`; the value runs
/// to the last quote on the line and must not be empty.
fn match_annotation(text: &str) -> Option<RawAnnotation<'_>> {
    let rest = text.strip_prefix(MARKER)?.strip_prefix('(')?;

    let key_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if key_len == 0 {
        return None;
    }
    let (key, rest) = rest.split_at(key_len);

    let rest = rest.strip_prefix(')')?.strip_prefix(':')?;
    let rest = rest.trim_start().strip_prefix('"')?;
    let end = rest.rfind('"')?;
    let value = &rest[..end];
    if value.is_empty() {
        return None;
    }

    Some(RawAnnotation { key, value })
}

/// A recognized annotation with its value parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// `@kok(op): "<METHOD> <PATTERN>"`
    Op { method: String, pattern: String },
    /// `@kok(param): "<name>[.<field>][,in=..][,name=..][,type=..][,required=..]"`
    Param { target: String, edit: ParamEdit },
    /// `@kok(success): "[statusCode=..][,mediaType=..][,encoder=..]"`
    Success(SuccessResponse),
    /// `@kok(failure): "[encoder=]<ref>"`
    Failure { encoder: String },
}

/// Why a raw annotation could not be turned into an [`Annotation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    UnknownKey,
    MalformedOp,
    Value(ValueError),
}

impl From<ValueError> for AnnotationError {
    fn from(err: ValueError) -> Self {
        AnnotationError::Value(err)
    }
}

impl Annotation {
    pub fn parse(raw: RawAnnotation<'_>) -> Result<Self, AnnotationError> {
        match raw.key {
            "op" => {
                let fields: Vec<&str> = raw.value.split_whitespace().collect();
                let [method, pattern] = fields.as_slice() else {
                    return Err(AnnotationError::MalformedOp);
                };
                Ok(Annotation::Op {
                    method: method.to_string(),
                    pattern: pattern.to_string(),
                })
            }
            "param" => {
                let descriptor = ParamDescriptor::parse(raw.value)?;
                let (target, edit) = ParamEdit::from_descriptor(descriptor);
                Ok(Annotation::Param { target, edit })
            }
            "success" => Ok(Annotation::Success(parse_success(raw.value)?)),
            "failure" => Ok(Annotation::Failure {
                encoder: parse_failure(raw.value)?,
            }),
            _ => Err(AnnotationError::UnknownKey),
        }
    }
}

fn parse_success(value: &str) -> Result<SuccessResponse, ValueError> {
    let mut resp = SuccessResponse::default();

    for segment in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((key, val)) = segment.split_once('=') else {
            return Err(ValueError::new(format!(
                "expected `key=value`, got {segment:?}"
            )));
        };
        let (key, val) = (key.trim(), val.trim());
        if val.is_empty() {
            return Err(ValueError::new(format!("empty value for `{key}`")));
        }

        match key {
            "statusCode" => {
                let code: u16 = val
                    .parse()
                    .map_err(|_| ValueError::new(format!("invalid status code {val:?}")))?;
                if !(100..=599).contains(&code) {
                    return Err(ValueError::new(format!("status code {code} out of range")));
                }
                resp.status_code = code;
            }
            "mediaType" => resp.media_type = val.to_string(),
            "encoder" => resp.encoder = Some(val.to_string()),
            other => {
                return Err(ValueError::new(format!(
                    "unknown success attribute `{other}` (valid: statusCode, mediaType, encoder)"
                )));
            }
        }
    }

    if resp.media_type.is_empty() {
        resp.media_type = MEDIA_TYPE_JSON.to_string();
    }
    Ok(resp)
}

fn parse_failure(value: &str) -> Result<String, ValueError> {
    let value = value.trim();
    let encoder = match value.split_once('=') {
        Some(("encoder", encoder)) => encoder.trim(),
        Some((key, _)) => {
            return Err(ValueError::new(format!(
                "unknown failure attribute `{}` (valid: encoder)",
                key.trim()
            )));
        }
        None => value,
    };

    if encoder.is_empty() || encoder.contains(char::is_whitespace) {
        return Err(ValueError::new(format!("invalid encoder reference {encoder:?}")));
    }
    Ok(encoder.to_string())
}
