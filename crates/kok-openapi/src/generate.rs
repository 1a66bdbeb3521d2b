//! OpenAPI documents from compiled operations.

use std::collections::HashMap;

use heck::ToSnakeCase;
use http::StatusCode;
use kok_parse::{Location, MEDIA_TYPE_JSON, Operation, Param, Specification};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::Result;
use crate::builder::OpenApiBuilder;
use crate::config::DocConfig;
use crate::schema::{Response, ResponseSchema};
use crate::types::{OpenApiOperation, OpenApiParameter, OpenApiPath};

/// Generates an OpenAPI document for a [`Specification`].
///
/// Success and failure responses come from a [`ResponseSchema`] (usually a
/// [`Deriver`](crate::Deriver)), fed with the example body registered for
/// each operation.
#[derive(Debug, Clone, Default)]
pub struct OpenApiGenerator {
    config: DocConfig,
    examples: HashMap<String, Value>,
}

impl OpenApiGenerator {
    pub fn new(config: DocConfig) -> Self {
        Self {
            config,
            examples: HashMap::new(),
        }
    }

    /// Example success body for the operation `name`.
    pub fn with_example(mut self, name: impl Into<String>, body: Value) -> Self {
        self.examples.insert(name.into(), body);
        self
    }

    pub fn config(&self) -> &DocConfig {
        &self.config
    }

    pub fn generate(&self, spec: &Specification, schema: &dyn ResponseSchema) -> Result<Value> {
        let paths = spec
            .iter()
            .map(|op| self.path(op, schema))
            .collect::<Result<Vec<_>>>()?;

        Ok(OpenApiBuilder::from_config(&self.config)
            .merge_paths(paths)?
            .build())
    }

    /// Document a single operation.
    pub fn path(&self, op: &Operation, schema: &dyn ResponseSchema) -> Result<OpenApiPath> {
        let mut operation = OpenApiOperation::default().with_id(&op.name);
        if let Some(description) = &op.description {
            operation.summary = Some(summary_line(description).to_string());
            operation.description = Some(description.clone());
        }

        let mut body = BodySchema::default();
        for param in &op.params {
            // Fields left in the body travel inside the argument itself
            let in_body = param.location == Location::Body;
            if in_body || !param.is_split() {
                self.place(param, &mut operation, &mut body);
            }
            for sub in param.sub_params.values() {
                if !(in_body && sub.location == Location::Body) {
                    self.place(sub, &mut operation, &mut body);
                }
            }
        }
        if let Some(request_body) = body.into_request_body() {
            operation = operation.with_request_body(request_body);
        }

        let null = Value::Null;
        let example = self.examples.get(&op.name).unwrap_or(&null);
        let success = schema.operation_response(op, example)?;
        operation = operation.with_response(success.status_code.to_string(), response_object(&success));

        for failure in schema.operation_failures(op) {
            operation =
                operation.with_response(failure.status_code.to_string(), response_object(&failure));
        }

        debug!(operation = %op.name, method = %op.method, pattern = %op.pattern, "documented operation");
        Ok(OpenApiPath::new(openapi_path(&op.pattern), &op.method).with_operation(operation))
    }

    fn place(&self, param: &Param, operation: &mut OpenApiOperation, body: &mut BodySchema) {
        let schema = type_schema(&param.ty);
        match OpenApiParameter::at(param.location, param.wire_name(), param.required) {
            Some(p) => operation.parameters.push(p.with_schema(schema)),
            None => {
                let name = if self.config.snake_case_properties {
                    param.wire_name().to_snake_case()
                } else {
                    param.wire_name().to_string()
                };
                body.add(name, schema, param.required);
            }
        }
    }
}

#[derive(Default)]
struct BodySchema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl BodySchema {
    fn add(&mut self, name: String, schema: Value, required: bool) {
        if required {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
    }

    fn into_request_body(self) -> Option<Value> {
        if self.properties.is_empty() {
            return None;
        }
        let mut schema = json!({"type": "object", "properties": self.properties});
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        Some(json!({
            "required": true,
            "content": { "application/json": { "schema": schema } }
        }))
    }
}

/// Drop the regexp of `{id:[0-9]+}` placeholders.
fn openapi_path(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut depth = 0usize;
    let mut in_regexp = false;
    for c in pattern.chars() {
        match c {
            '{' => {
                depth += 1;
                if !in_regexp {
                    out.push(c);
                }
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    in_regexp = false;
                    out.push(c);
                } else if !in_regexp {
                    out.push(c);
                }
            }
            ':' if depth == 1 && !in_regexp => in_regexp = true,
            _ if in_regexp => {}
            _ => out.push(c),
        }
    }
    out
}

fn summary_line(description: &str) -> &str {
    description.lines().next().unwrap_or_default().trim()
}

/// OpenAPI response object for a derived response.
fn response_object(resp: &Response) -> Value {
    let description = StatusCode::from_u16(resp.status_code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Response");
    let content_type = if resp.content_type.is_empty() {
        MEDIA_TYPE_JSON
    } else {
        resp.content_type.as_str()
    };

    let media = match &resp.body {
        None => json!({"schema": {"type": "string", "format": "binary"}}),
        Some(Value::Null) => json!({"schema": {}}),
        Some(body) => json!({"schema": value_schema(body), "example": body}),
    };

    let mut content = Map::new();
    content.insert(content_type.to_string(), media);
    json!({"description": description, "content": content})
}

/// JSON schema type for a Rust type name.
///
/// `Option<T>` and smart pointers document as their inner type. An empty
/// type (an untyped field override) is a string; unknown types are objects.
pub fn infer_json_type(ty: &str) -> &'static str {
    let ty = ty.trim();
    if ty.is_empty() {
        return "string";
    }
    let ty = ty.trim_start_matches('&').trim_start_matches("mut ").trim();
    if ty.starts_with('[') {
        return "array";
    }

    let (outer, inner) = match ty.split_once('<') {
        Some((outer, rest)) => (outer.trim(), rest.strip_suffix('>').unwrap_or(rest)),
        None => (ty, ""),
    };
    let outer = outer.rsplit("::").next().unwrap_or(outer);

    match outer {
        "Option" | "Box" | "Arc" | "Rc" | "Cow" => infer_json_type(inner),
        "String" | "str" | "char" => "string",
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => "integer",
        "f32" | "f64" => "number",
        "bool" => "boolean",
        "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => "array",
        _ => "object",
    }
}

fn type_schema(ty: &str) -> Value {
    json!({"type": infer_json_type(ty)})
}

/// Schema describing an example value.
pub fn value_schema(value: &Value) -> Value {
    match value {
        Value::Null => json!({}),
        Value::Bool(_) => json!({"type": "boolean"}),
        Value::Number(n) if n.is_f64() => json!({"type": "number"}),
        Value::Number(_) => json!({"type": "integer"}),
        Value::String(_) => json!({"type": "string"}),
        Value::Array(items) => {
            let items = items.first().map(value_schema).unwrap_or_else(|| json!({}));
            json!({"type": "array", "items": items})
        }
        Value::Object(fields) => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|(k, v)| (k.clone(), value_schema(v)))
                .collect();
            json!({"type": "object", "properties": properties})
        }
    }
}
