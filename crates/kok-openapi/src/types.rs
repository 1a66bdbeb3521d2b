//! Typed OpenAPI structures.
//!
//! The subset of OpenAPI 3.0 that generated documents use.

use kok_parse::Location;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// An operation bound to its path and HTTP method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenApiPath {
    /// The path pattern (e.g., "/profiles/{id}").
    pub path: String,
    /// HTTP method, lowercase.
    pub method: String,
    pub operation: OpenApiOperation,
}

/// An OpenAPI operation object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<OpenApiParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    /// Response objects keyed by status code.
    #[serde(default)]
    pub responses: Map<String, Value>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An OpenAPI parameter object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenApiParameter {
    pub name: String,
    /// "path", "query" or "header".
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OpenApiPath {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into().to_lowercase(),
            operation: OpenApiOperation::default(),
        }
    }

    pub fn with_operation(mut self, operation: OpenApiOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl OpenApiOperation {
    /// Create an operation with a summary.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameter(mut self, param: OpenApiParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_request_body(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }

    /// Add a response; a later response for the same status replaces it.
    pub fn with_response(mut self, status: impl Into<String>, response: Value) -> Self {
        self.responses.insert(status.into(), response);
        self
    }
}

impl OpenApiParameter {
    fn new(name: impl Into<String>, location: &str, required: bool) -> Self {
        Self {
            name: name.into(),
            location: location.to_string(),
            required,
            schema: json!({"type": "string"}),
            description: None,
            extra: Map::new(),
        }
    }

    /// Create a path parameter; path parameters are always required.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, "path", true)
    }

    pub fn query(name: impl Into<String>, required: bool) -> Self {
        Self::new(name, "query", required)
    }

    pub fn header(name: impl Into<String>, required: bool) -> Self {
        Self::new(name, "header", required)
    }

    /// Parameter for a wire location, `None` for the body.
    pub fn at(location: Location, name: impl Into<String>, required: bool) -> Option<Self> {
        match location {
            Location::Path => Some(Self::path(name)),
            Location::Query => Some(Self::query(name, required)),
            Location::Header => Some(Self::header(name, required)),
            Location::Body => None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}
