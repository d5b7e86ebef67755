//! Assistant configuration entities and their wire format.
//!
//! The middleware returns its client configuration as a JSON document:
//!
//! ```json
//! {
//!   "ActiveAssistant": {
//!     "short_name": "default",
//!     "models": [ { "model_type": "chat_model", "full_name": "...", ... }, ... ],
//!     "all_models": [ ... ]
//!   },
//!   "local_model_hub": "..."
//! }
//! ```
//!
//! [`ClientConfig::parse`] turns that document into typed values, and
//! [`AssistantConfig::models_json`] produces the array a configuration write
//! expects. Fields this crate does not model are carried along untouched.

use super::descriptor::ModelDescriptor;
use super::role::ModelRole;
use crate::core::error::{DomainError, to_json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The models currently selected for an assistant, at most one per role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSelection {
    embedding: Option<ModelDescriptor>,
    ranker: Option<ModelDescriptor>,
    chat: Option<ModelDescriptor>,
}

impl ModelSelection {
    /// Classify `models` by their `model_type`.
    ///
    /// Entries with an unknown discriminator are ignored. When a role
    /// appears more than once the last entry wins.
    pub fn from_models<'a>(models: impl IntoIterator<Item = &'a ModelDescriptor>) -> Self {
        let mut selection = Self::default();
        for model in models {
            if let Some(role) = model.role() {
                selection.set(role, model.clone());
            }
        }
        selection
    }

    pub fn get(&self, role: ModelRole) -> Option<&ModelDescriptor> {
        self.slot(role).as_ref()
    }

    /// Replace the selection for `role`, returning the previous one.
    pub fn set(&mut self, role: ModelRole, model: ModelDescriptor) -> Option<ModelDescriptor> {
        self.slot_mut(role).replace(model)
    }

    /// Selected models in write order, skipping empty roles.
    pub fn iter(&self) -> impl Iterator<Item = (ModelRole, &ModelDescriptor)> {
        ModelRole::WRITE_ORDER
            .into_iter()
            .filter_map(|role| self.get(role).map(|m| (role, m)))
    }

    /// Roles with no selected model.
    pub fn missing_roles(&self) -> Vec<ModelRole> {
        ModelRole::WRITE_ORDER
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_roles().is_empty()
    }

    fn slot(&self, role: ModelRole) -> &Option<ModelDescriptor> {
        match role {
            ModelRole::Embedding => &self.embedding,
            ModelRole::Ranker => &self.ranker,
            ModelRole::Chat => &self.chat,
        }
    }

    fn slot_mut(&mut self, role: ModelRole) -> &mut Option<ModelDescriptor> {
        match role {
            ModelRole::Embedding => &mut self.embedding,
            ModelRole::Ranker => &mut self.ranker,
            ModelRole::Chat => &mut self.chat,
        }
    }
}

/// The active assistant: a named bundle of role-scoped models plus the
/// catalog of every model the middleware can switch to.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    short_name: String,
    selection: ModelSelection,
    catalog: Vec<ModelDescriptor>,
    extra: Map<String, Value>,
}

impl AssistantConfig {
    pub fn new(short_name: impl Into<String>, catalog: Vec<ModelDescriptor>) -> Self {
        Self {
            short_name: short_name.into(),
            selection: ModelSelection::default(),
            catalog,
            extra: Map::new(),
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn selection(&self) -> &ModelSelection {
        &self.selection
    }

    pub fn selected(&self, role: ModelRole) -> Option<&ModelDescriptor> {
        self.selection.get(role)
    }

    pub fn catalog(&self) -> &[ModelDescriptor] {
        &self.catalog
    }

    /// Catalog entries playing `role`.
    pub fn catalog_for(&self, role: ModelRole) -> impl Iterator<Item = &ModelDescriptor> {
        self.catalog.iter().filter(move |m| m.role() == Some(role))
    }

    /// Assistant fields this crate does not model (kept for round trips).
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Look up a `role` model in the catalog by exact `full_name`.
    pub fn find_in_catalog(&self, role: ModelRole, full_name: &str) -> Option<&ModelDescriptor> {
        self.catalog_for(role).find(|m| m.full_name == full_name)
    }

    /// Select the catalog model named `full_name` for `role`.
    ///
    /// Only that role's selection changes. Fails with
    /// [`DomainError::ModelNotFound`] when the catalog has no such model.
    pub fn select_model(
        &mut self,
        role: ModelRole,
        full_name: &str,
    ) -> Result<&ModelDescriptor, DomainError> {
        let model = self
            .find_in_catalog(role, full_name)
            .cloned()
            .ok_or_else(|| DomainError::ModelNotFound {
                role,
                full_name: full_name.to_string(),
            })?;
        Ok(&*self.selection.slot_mut(role).insert(model))
    }

    /// Select a new chat model, leaving embedding and ranker untouched.
    pub fn select_chat_model(&mut self, full_name: &str) -> Result<&ModelDescriptor, DomainError> {
        self.select_model(ModelRole::Chat, full_name)
    }

    /// Consuming variant of [`select_chat_model`](Self::select_chat_model).
    pub fn with_chat_model(mut self, full_name: &str) -> Result<Self, DomainError> {
        self.select_chat_model(full_name)?;
        Ok(self)
    }

    /// First catalog chat model that is not the current one.
    pub fn next_chat_model(&self) -> Option<&ModelDescriptor> {
        let current = self.selected(ModelRole::Chat).map(|m| m.full_name.as_str());
        self.catalog_for(ModelRole::Chat)
            .find(|m| Some(m.full_name.as_str()) != current)
    }

    /// Selected roles whose model is not listed in the catalog.
    ///
    /// Selections made through [`select_model`](Self::select_model) always
    /// come from the catalog; this reports what the middleware itself sent.
    pub fn unlisted_selections(&self) -> Vec<ModelRole> {
        self.selection
            .iter()
            .filter(|(role, m)| self.find_in_catalog(*role, &m.full_name).is_none())
            .map(|(role, _)| role)
            .collect()
    }

    /// Serialize the selection as the JSON array a configuration write expects.
    ///
    /// Exactly three entries, ordered embedding, ranker, chat, each in the
    /// shape the configuration read returned.
    pub fn models_json(&self) -> Result<String, DomainError> {
        if let Some(role) = self.selection.missing_roles().into_iter().next() {
            return Err(DomainError::MissingSelection(role));
        }
        let models: Vec<&ModelDescriptor> = self.selection.iter().map(|(_, m)| m).collect();
        to_json("models_json", &models)
    }

    fn from_wire(wire: AssistantWire) -> Self {
        let selection = ModelSelection::from_models(&wire.models);
        Self {
            short_name: wire.short_name,
            selection,
            catalog: wire.all_models,
            extra: wire.extra,
        }
    }

    fn to_wire(&self) -> AssistantWire {
        AssistantWire {
            short_name: self.short_name.clone(),
            models: self.selection.iter().map(|(_, m)| m.clone()).collect(),
            all_models: self.catalog.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// The full configuration-read payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    assistant: AssistantConfig,
    extra: Map<String, Value>,
}

impl ClientConfig {
    pub fn new(assistant: AssistantConfig) -> Self {
        Self {
            assistant,
            extra: Map::new(),
        }
    }

    /// Parse the JSON document returned by a configuration read.
    ///
    /// Fails with [`DomainError::ConfigParse`] when the payload is not JSON,
    /// has no `ActiveAssistant` object, or any field has the wrong shape.
    pub fn parse(payload: &str) -> Result<Self, DomainError> {
        let wire: ClientConfigWire =
            serde_json::from_str(payload).map_err(|e| DomainError::ConfigParse(e.to_string()))?;
        let assistant = wire
            .active_assistant
            .ok_or_else(|| DomainError::ConfigParse("missing ActiveAssistant".to_string()))?;
        Ok(Self {
            assistant: AssistantConfig::from_wire(assistant),
            extra: wire.extra,
        })
    }

    /// Serialize back into the read-shaped document.
    pub fn to_payload(&self) -> Result<String, DomainError> {
        let wire = ClientConfigWire {
            active_assistant: Some(self.assistant.to_wire()),
            extra: self.extra.clone(),
        };
        to_json("client configuration", &wire)
    }

    pub fn active_assistant(&self) -> &AssistantConfig {
        &self.assistant
    }

    pub fn active_assistant_mut(&mut self) -> &mut AssistantConfig {
        &mut self.assistant
    }

    pub fn into_active_assistant(self) -> AssistantConfig {
        self.assistant
    }

    /// Directory where the middleware keeps downloaded models, when reported.
    pub fn local_model_hub(&self) -> Option<&str> {
        self.extra.get("local_model_hub").and_then(|v| v.as_str())
    }

    /// Top-level fields this crate does not model.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssistantWire {
    short_name: String,
    models: Vec<ModelDescriptor>,
    all_models: Vec<ModelDescriptor>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClientConfigWire {
    #[serde(rename = "ActiveAssistant", default)]
    active_assistant: Option<AssistantWire>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}
