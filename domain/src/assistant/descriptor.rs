//! Model descriptor entity

use super::role::ModelRole;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One model known to the middleware.
///
/// Identity is `full_name`. Every field the middleware sends besides
/// `model_type` and `full_name` is kept in `metadata` and written back
/// unchanged, so a descriptor read from the server can be sent in a
/// configuration write without losing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Wire discriminator (`embedding_model`, `ranker_model`, `chat_model`, ...)
    pub model_type: String,
    /// Unique identifier within the catalog
    pub full_name: String,
    /// Everything else the middleware attached to this model
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ModelDescriptor {
    pub fn new(role: ModelRole, full_name: impl Into<String>) -> Self {
        Self {
            model_type: role.as_str().to_string(),
            full_name: full_name.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata field (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The role this model plays, if its discriminator is a known one.
    pub fn role(&self) -> Option<ModelRole> {
        ModelRole::from_model_type(&self.model_type)
    }

    /// String-valued metadata field.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Where the middleware downloads this model from, when advertised.
    pub fn download_link(&self) -> Option<&str> {
        self.metadata_str("download_link")
    }
}
