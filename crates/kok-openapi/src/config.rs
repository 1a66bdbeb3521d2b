//! Document settings loaded from TOML.
//!
//! ```toml
//! title = "Profile Service"
//! version = "1.2.0"
//! servers = ["https://api.example.com"]
//! snake_case_properties = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Settings for a generated document. Every field is optional in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// Server base URLs.
    pub servers: Vec<String>,
    /// Rename request body properties to snake_case (`userName` -> `user_name`).
    pub snake_case_properties: bool,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            servers: Vec::new(),
            snake_case_properties: false,
        }
    }
}

impl DocConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
