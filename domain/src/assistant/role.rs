//! Model role value object

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The function a model serves inside an assistant.
///
/// On the wire the role appears as the `model_type` discriminator
/// (`embedding_model`, `ranker_model`, `chat_model`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelRole {
    Embedding,
    Ranker,
    Chat,
}

impl ModelRole {
    /// Fixed order used when writing the selection back to the middleware.
    pub const WRITE_ORDER: [ModelRole; 3] =
        [ModelRole::Embedding, ModelRole::Ranker, ModelRole::Chat];

    /// Wire discriminator for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelRole::Embedding => "embedding_model",
            ModelRole::Ranker => "ranker_model",
            ModelRole::Chat => "chat_model",
        }
    }

    /// Map a `model_type` discriminator to a role, if it is one we know.
    pub fn from_model_type(model_type: &str) -> Option<Self> {
        match model_type {
            "embedding_model" => Some(ModelRole::Embedding),
            "ranker_model" => Some(ModelRole::Ranker),
            "chat_model" => Some(ModelRole::Chat),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ModelRole::Embedding => "embedding model",
            ModelRole::Ranker => "ranker model",
            ModelRole::Chat => "chat model",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for ModelRole {
    type Err = String;

    /// Accepts both the wire discriminator and the short role name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "embedding_model" | "embedding" => Ok(ModelRole::Embedding),
            "ranker_model" | "ranker" | "reranker" => Ok(ModelRole::Ranker),
            "chat_model" | "chat" => Ok(ModelRole::Chat),
            other => Err(format!("unknown model role: {}", other)),
        }
    }
}

impl Serialize for ModelRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
