//! Wire parameter model and the `param` annotation grammar.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Where a parameter travels in an HTTP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Header,
    #[default]
    Body,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Header => "header",
            Location::Body => "body",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = ValueError;

    /// Parse from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path" => Ok(Location::Path),
            "query" => Ok(Location::Query),
            "header" => Ok(Location::Header),
            "body" => Ok(Location::Body),
            other => Err(ValueError::new(format!(
                "unknown location {other:?}, expected one of: path, query, header, body"
            ))),
        }
    }
}

/// One wire parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Argument name in the method signature
    pub name: String,
    /// Name used on the wire (defaults to `name`)
    pub alias: String,
    #[serde(rename = "in")]
    pub location: Location,
    /// Declared type, as written in the signature
    #[serde(rename = "type")]
    pub ty: String,
    pub required: bool,
    /// Per-field placement overrides for a composite argument
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_params: BTreeMap<String, Param>,
}

impl Param {
    /// A body parameter named after the argument.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ty.into();
        Self {
            alias: name.clone(),
            required: default_required(Location::Body, &ty),
            name,
            location: Location::Body,
            ty,
            sub_params: BTreeMap::new(),
        }
    }

    /// Name used on the wire.
    pub fn wire_name(&self) -> &str {
        &self.alias
    }

    pub fn sub_param(&self, name: &str) -> Option<&Param> {
        self.sub_params.get(name)
    }

    /// Whether any field of this argument is carried outside its own location.
    pub fn is_split(&self) -> bool {
        !self.sub_params.is_empty()
    }
}

/// Path parameters are always required; otherwise anything but `Option<T>` is.
pub fn default_required(location: Location, ty: &str) -> bool {
    location == Location::Path || !is_option_type(ty)
}

/// Check if a type string is `Option<T>`
pub fn is_option_type(ty: &str) -> bool {
    let ty = ty.trim();
    let last = ty.rsplit("::").next().unwrap_or(ty);
    last.starts_with("Option<") && last.ends_with('>')
}

/// Parsed value of a `param` annotation, not yet bound to an argument.
///
/// Grammar: comma separated segments. A bare segment is the name
/// (`arg` or `arg.field`); the others are `in=<location>`,
/// `name=<wire name>`, `type=<type>` and `required=<true|false>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamDescriptor {
    pub name: String,
    pub alias: Option<String>,
    pub location: Option<Location>,
    pub ty: Option<String>,
    pub required: Option<bool>,
}

impl ParamDescriptor {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let mut desc = ParamDescriptor::default();

        for segment in split_top_level(text) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let Some((key, value)) = segment.split_once('=') else {
                if !desc.name.is_empty() {
                    return Err(ValueError::new(format!(
                        "more than one name given ({:?} and {segment:?})",
                        desc.name
                    )));
                }
                desc.name = segment.to_string();
                continue;
            };

            let (key, value) = (key.trim(), value.trim());
            if value.is_empty() {
                return Err(ValueError::new(format!("empty value for `{key}`")));
            }

            match key {
                "in" => desc.location = Some(value.parse()?),
                "name" => desc.alias = Some(value.to_string()),
                "type" => desc.ty = Some(value.to_string()),
                "required" => {
                    desc.required = Some(value.parse().map_err(|_| {
                        ValueError::new(format!("`required` must be true or false, got {value:?}"))
                    })?)
                }
                other => {
                    return Err(ValueError::new(format!(
                        "unknown param attribute `{other}` (valid: in, name, type, required)"
                    )));
                }
            }
        }

        if desc.name.is_empty() {
            return Err(ValueError::new("missing param name"));
        }

        Ok(desc)
    }

    /// Split the name on the first `.` into `(argument, field)`.
    ///
    /// The field part is empty when the descriptor targets the whole argument.
    pub fn split_name(&self) -> (&str, &str) {
        match self.name.split_once('.') {
            Some((top, sub)) => (top, sub),
            None => (self.name.as_str(), ""),
        }
    }

    fn into_param(self, name: String, inherited_ty: &str) -> Param {
        let location = self.location.unwrap_or_default();
        let ty = self.ty.unwrap_or_else(|| inherited_ty.to_string());
        Param {
            alias: self.alias.unwrap_or_else(|| name.clone()),
            required: self
                .required
                .unwrap_or_else(|| default_required(location, &ty)),
            name,
            location,
            ty,
            sub_params: BTreeMap::new(),
        }
    }
}

/// How a `param` annotation changes the argument it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamEdit {
    /// Overwrite the argument's location, wire name, type and requiredness.
    ReplaceWhole(ParamDescriptor),
    /// Add or overwrite the placement of one field of a composite argument.
    MergeSubField {
        sub_name: String,
        descriptor: ParamDescriptor,
    },
}

impl ParamEdit {
    /// Classify a descriptor, returning the targeted argument name alongside.
    pub fn from_descriptor(descriptor: ParamDescriptor) -> (String, ParamEdit) {
        let (top, sub) = descriptor.split_name();
        let (top, sub) = (top.to_string(), sub.to_string());
        if sub.is_empty() {
            (top, ParamEdit::ReplaceWhole(descriptor))
        } else {
            (
                top,
                ParamEdit::MergeSubField {
                    sub_name: sub,
                    descriptor,
                },
            )
        }
    }

    /// Apply the edit. Field overrides already attached to `param` survive a
    /// whole-argument replacement; a field override never touches the
    /// argument itself.
    pub fn apply_to(self, param: &mut Param) {
        match self {
            ParamEdit::ReplaceWhole(descriptor) => {
                let sub_params = std::mem::take(&mut param.sub_params);
                let mut replaced = descriptor.into_param(param.name.clone(), &param.ty);
                replaced.sub_params = sub_params;
                *param = replaced;
            }
            ParamEdit::MergeSubField {
                sub_name,
                descriptor,
            } => {
                let sub = descriptor.into_param(sub_name.clone(), "");
                param.sub_params.insert(sub_name, sub);
            }
        }
    }
}

/// Split on commas that are not nested inside `<>`, `()` or `[]`.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
