//! Extension manifest types.

use serde::{Deserialize, Serialize};

/// Extension manifest containing identity and dependency declarations.
///
/// `ref_name` must be unique within a bootstrap run; a duplicate is
/// rejected rather than silently replacing the first registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub ref_name: String,
    #[serde(default)]
    pub description: String,
    /// Names of other extensions that must be attached before this one's
    /// initializers run.
    #[serde(default)]
    pub depends: Vec<String>,
}

impl ExtensionManifest {
    /// Create a new extension manifest.
    pub fn new(ref_name: impl Into<String>) -> Self {
        Self {
            ref_name: ref_name.into(),
            description: String::new(),
            depends: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_depends(mut self, depends: Vec<String>) -> Self {
        self.depends = depends;
        self
    }
}
