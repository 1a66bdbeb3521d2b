//! Interface description consumed by the compiler.

use std::collections::HashMap;

/// Raw comment lines per method name. A method without an entry is not
/// exposed over HTTP.
pub type CommentBlocks = HashMap<String, Vec<String>>;

/// A method argument as declared in the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParam {
    pub name: String,
    /// Type as string
    pub ty: String,
}

/// A method of the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Parameters in declaration order
    pub params: Vec<MethodParam>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push(MethodParam {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }
}

/// Ordered methods of one service interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDescription {
    pub name: String,
    pub methods: Vec<Method>,
}

impl InterfaceDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }
}
