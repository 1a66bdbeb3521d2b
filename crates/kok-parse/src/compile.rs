//! Annotation compiler: interface description + comments -> specification.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::Result;
use crate::annotation::{Annotation, AnnotationError, Line, scan_line};
use crate::error::CompileError;
use crate::interface::{CommentBlocks, InterfaceDescription, Method};
use crate::operation::{Operation, Specification};
use crate::param::Param;

/// Compile every commented method of `iface` into an [`Operation`].
///
/// Methods without a comment block are skipped. The first malformed
/// annotation or incomplete operation aborts the whole run; no partial
/// specification is returned.
///
/// # Example
///
/// ```
/// use kok_parse::{CommentBlocks, InterfaceDescription, Location, Method, compile};
///
/// let iface = InterfaceDescription::new("Service")
///     .with_method(Method::new("GetProfile").with_param("id", "String"));
/// let mut docs = CommentBlocks::new();
/// docs.insert(
///     "GetProfile".to_string(),
///     vec![
///         r#"@kok(op): "GET /profiles/{id}""#.to_string(),
///         r#"@kok(param): "id,in=path""#.to_string(),
///     ],
/// );
///
/// let spec = compile(&iface, &docs).unwrap();
/// assert_eq!(spec.operations[0].params[0].location, Location::Path);
/// ```
pub fn compile(iface: &InterfaceDescription, docs: &CommentBlocks) -> Result<Specification> {
    let mut spec = Specification::default();

    for method in &iface.methods {
        let Some(comments) = docs.get(&method.name) else {
            debug!(method = %method.name, "no comment block, skipping");
            continue;
        };

        let op = compile_method(method, comments)?;
        debug!(
            method = %op.name,
            verb = %op.method,
            pattern = %op.pattern,
            "compiled operation"
        );
        spec.operations.push(op);
    }

    Ok(spec)
}

/// Compile a single method from its comment lines.
pub fn compile_method(method: &Method, comments: &[String]) -> Result<Operation> {
    let mut op = Operation::new(&method.name);

    // Every argument starts out in the body with its declared type.
    let mut seen = HashSet::new();
    for mp in &method.params {
        if !seen.insert(mp.name.as_str()) {
            return Err(CompileError::DuplicateParam {
                method: method.name.clone(),
                param: mp.name.clone(),
            });
        }
        op.params.push(Param::new(&mp.name, &mp.ty));
    }

    let mut prose = Vec::new();

    for comment in comments {
        let raw = match scan_line(comment) {
            Line::Prose => {
                prose.push(strip_comment_marker(comment));
                continue;
            }
            Line::Invalid => {
                return Err(CompileError::InvalidAnnotation {
                    method: op.name.clone(),
                    comment: comment.clone(),
                });
            }
            Line::Annotation(raw) => raw,
        };
        trace!(method = %op.name, key = raw.key, value = raw.value, "annotation");

        let annotation = Annotation::parse(raw).map_err(|err| match err {
            AnnotationError::UnknownKey => CompileError::UnknownKey {
                method: op.name.clone(),
                key: raw.key.to_string(),
                comment: comment.clone(),
            },
            AnnotationError::MalformedOp => CompileError::MalformedOp {
                method: op.name.clone(),
                value: raw.value.to_string(),
                comment: comment.clone(),
            },
            AnnotationError::Value(err) => CompileError::InvalidValue {
                method: op.name.clone(),
                key: raw.key.to_string(),
                value: raw.value.to_string(),
                reason: err.0,
                comment: comment.clone(),
            },
        })?;

        match annotation {
            Annotation::Op { method, pattern } => {
                op.method = method;
                op.pattern = pattern;
            }
            Annotation::Param { target, edit } => {
                let name = op.name.clone();
                let Some(param) = op.param_mut(&target) else {
                    return Err(CompileError::UndeclaredParam {
                        method: name,
                        param: target,
                        comment: comment.clone(),
                    });
                };
                edit.apply_to(param);
            }
            Annotation::Success(resp) => op.success_response = resp,
            Annotation::Failure { encoder } => op.options.failure_encoder = Some(encoder),
        }
    }

    if op.method.is_empty() {
        return Err(CompileError::MissingMethod { method: op.name });
    }
    if op.pattern.is_empty() {
        return Err(CompileError::MissingPattern { method: op.name });
    }

    op.description = join_prose(prose);
    Ok(op)
}

fn strip_comment_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("///")
        .or_else(|| line.strip_prefix("//"))
        .or_else(|| line.strip_prefix("/*"))
        .or_else(|| line.strip_prefix('*'))
        .unwrap_or(line);
    line.strip_suffix("*/").unwrap_or(line).trim()
}

fn join_prose(lines: Vec<&str>) -> Option<String> {
    let text = lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
