//! OpenAPI document builder.

use serde_json::{Map, Value, json};

use crate::Result;
use crate::config::DocConfig;
use crate::error::OpenApiError;
use crate::types::OpenApiPath;

/// Builds an OpenAPI 3.0 document, merging paths and component schemas
/// from several sources.
///
/// # Example
///
/// ```
/// use kok_openapi::{OpenApiBuilder, OpenApiOperation, OpenApiPath};
///
/// let doc = OpenApiBuilder::new()
///     .title("Profile Service")
///     .version("1.0.0")
///     .merge_paths(vec![
///         OpenApiPath::new("/profiles", "POST")
///             .with_operation(OpenApiOperation::new("Create a profile")),
///     ])?
///     .build();
///
/// assert_eq!(doc["paths"]["/profiles"]["post"]["summary"], "Create a profile");
/// # Ok::<(), kok_openapi::OpenApiError>(())
/// ```
///
/// # Conflict Resolution
///
/// - **Paths**: Last write wins for the same path and method.
/// - **Schemas**: Identical schemas are deduplicated; different schemas with same name cause an error.
#[derive(Debug, Clone, Default)]
pub struct OpenApiBuilder {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
    servers: Vec<String>,
    paths: Map<String, Value>,
    schemas: Map<String, Value>,
}

impl OpenApiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with the info and servers of `config`.
    pub fn from_config(config: &DocConfig) -> Self {
        let mut builder = Self::new()
            .title(&config.title)
            .version(&config.version);
        if let Some(description) = &config.description {
            builder = builder.description(description);
        }
        for url in &config.servers {
            builder = builder.server(url);
        }
        builder
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a server base URL.
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.servers.push(url.into());
        self
    }

    /// Merge another OpenAPI document.
    ///
    /// Paths and schemas are taken from it; its info is ignored.
    pub fn merge(mut self, spec: Value) -> Result<Self> {
        if let Some(paths) = spec.get("paths").and_then(|p| p.as_object()) {
            for (path, methods) in paths {
                let Some(methods) = methods.as_object() else {
                    return Err(OpenApiError::InvalidSpec {
                        message: format!("path item '{path}' is not an object"),
                    });
                };
                for (method, operation) in methods {
                    self.insert_operation(path, method, operation.clone());
                }
            }
        }

        if let Some(schemas) = spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (name, schema) in schemas {
                self.merge_schema(name.clone(), schema.clone())?;
            }
        }

        Ok(self)
    }

    /// Merge typed paths.
    pub fn merge_paths(mut self, paths: Vec<OpenApiPath>) -> Result<Self> {
        for path_def in paths {
            let operation = serde_json::to_value(&path_def.operation)?;
            self.insert_operation(&path_def.path, &path_def.method.to_lowercase(), operation);
        }
        Ok(self)
    }

    fn insert_operation(&mut self, path: &str, method: &str, operation: Value) {
        let entry = self
            .paths
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = entry {
            methods.insert(method.to_string(), operation);
        }
    }

    fn merge_schema(&mut self, name: String, schema: Value) -> Result<()> {
        match self.schemas.get(&name) {
            Some(existing) if existing != &schema => Err(OpenApiError::SchemaConflict { name }),
            Some(_) => Ok(()),
            None => {
                self.schemas.insert(name, schema);
                Ok(())
            }
        }
    }

    pub fn build(self) -> Value {
        let mut info = Map::new();
        info.insert(
            "title".to_string(),
            Value::String(self.title.unwrap_or_else(|| "API".to_string())),
        );
        info.insert(
            "version".to_string(),
            Value::String(self.version.unwrap_or_else(|| "0.1.0".to_string())),
        );
        if let Some(desc) = self.description {
            info.insert("description".to_string(), Value::String(desc));
        }

        let mut spec = Map::new();
        spec.insert("openapi".to_string(), Value::String("3.0.0".to_string()));
        spec.insert("info".to_string(), Value::Object(info));

        if !self.servers.is_empty() {
            let servers = self.servers.iter().map(|url| json!({"url": url})).collect();
            spec.insert("servers".to_string(), Value::Array(servers));
        }

        // OpenAPI requires the paths object even when empty
        spec.insert("paths".to_string(), Value::Object(self.paths));

        if !self.schemas.is_empty() {
            spec.insert("components".to_string(), json!({"schemas": self.schemas}));
        }

        Value::Object(spec)
    }
}
