//! Compiled operations.

use serde::{Deserialize, Serialize};

use crate::param::Param;

/// Media type of the default success response.
pub const MEDIA_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Shape of the success response of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status_code: u16,
    pub media_type: String,
    /// Named encoder overriding the codec's default success encoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder: Option<String>,
}

impl Default for SuccessResponse {
    /// 200 with a JSON body.
    fn default() -> Self {
        Self {
            status_code: 200,
            media_type: MEDIA_TYPE_JSON.to_string(),
            encoder: None,
        }
    }
}

/// Per-operation settings that do not describe the wire shape directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Named encoder for failure responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_encoder: Option<String>,
}

/// One HTTP-exposed method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Method name in the interface
    pub name: String,
    /// HTTP verb, as annotated
    pub method: String,
    /// Path template, e.g. `/profiles/{id}`
    pub pattern: String,
    /// Prose lines of the comment block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameters in declaration order
    pub params: Vec<Param>,
    pub success_response: SuccessResponse,
    #[serde(default)]
    pub options: Options,
}

impl Operation {
    /// Stub named after `name`, without verb or pattern yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: String::new(),
            pattern: String::new(),
            description: None,
            params: Vec::new(),
            success_response: SuccessResponse::default(),
            options: Options::default(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub(crate) fn param_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    /// Names of the `{placeholders}` in the path pattern.
    pub fn path_vars(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        let mut rest = self.pattern.as_str();
        while let Some(open) = rest.find('{') {
            let Some(close) = placeholder_end(&rest[open..]) else {
                break;
            };
            let var = &rest[open + 1..open + close];
            // chi-style `{id:[0-9]+}` carries a regexp after the colon
            let var = var.split(':').next().unwrap_or(var);
            if !var.is_empty() {
                vars.push(var);
            }
            rest = &rest[open + close + 1..];
        }
        vars
    }
}

/// Offset of the `}` that closes the placeholder `s` starts with.
///
/// Braces inside a regexp such as `{id:[0-9]{4}}` are balanced.
fn placeholder_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Ordered list of operations produced by one compilation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub operations: Vec<Operation>,
}

impl Specification {
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl<'a> IntoIterator for &'a Specification {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
