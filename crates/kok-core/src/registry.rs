//! Codec lookup by operation name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::codec::Codec;
use crate::json::JsonCodec;

/// Named codecs plus a default.
///
/// Built once at startup with the `with_*` methods and read-only afterwards;
/// share it behind an `Arc` between the transport layer and documentation
/// generation.
///
/// # Example
///
/// ```
/// use kok_core::{CodecRegistry, JsonCodec};
///
/// let registry = CodecRegistry::new()
///     .with_codec("UploadAvatar", JsonCodec::new());
///
/// assert!(registry.contains("UploadAvatar"));
/// assert!(!registry.contains("GetProfile"));
/// ```
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
    default: Arc<dyn Codec>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.codecs.keys().collect();
        names.sort();
        f.debug_struct("CodecRegistry")
            .field("codecs", &names)
            .finish_non_exhaustive()
    }
}

impl CodecRegistry {
    /// Registry whose default is a plain [`JsonCodec`].
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
            default: Arc::new(JsonCodec::new()),
        }
    }

    pub fn with_default(mut self, codec: impl Codec + 'static) -> Self {
        self.default = Arc::new(codec);
        self
    }

    /// Bind `codec` to the operation (or encoder reference) `name`.
    pub fn with_codec(self, name: impl Into<String>, codec: impl Codec + 'static) -> Self {
        self.with_shared_codec(name, Arc::new(codec))
    }

    /// Bind an already shared codec, e.g. one codec for several operations.
    pub fn with_shared_codec(mut self, name: impl Into<String>, codec: Arc<dyn Codec>) -> Self {
        self.codecs.insert(name.into(), codec);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    pub fn default_codec(&self) -> &dyn Codec {
        self.default.as_ref()
    }

    /// Codec for the operation `name`, falling back to the default.
    pub fn codec(&self, name: &str) -> &dyn Codec {
        match self.codecs.get(name) {
            Some(codec) => codec.as_ref(),
            None => {
                debug!(operation = name, "no codec registered, using default");
                self.default.as_ref()
            }
        }
    }

    /// Like [`codec`](Self::codec), but an encoder reference registered
    /// under its own name takes precedence over the operation name.
    pub fn resolve(&self, operation: &str, encoder: Option<&str>) -> &dyn Codec {
        if let Some(codec) = encoder.and_then(|e| self.codecs.get(e)) {
            return codec.as_ref();
        }
        self.codec(operation)
    }

    /// Shared handle to the codec for `name`.
    pub fn shared(&self, name: &str) -> Arc<dyn Codec> {
        self.codecs
            .get(name)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }
}
