use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider id of the model used when nothing else is selected.
pub const DEFAULT_MODEL_ID: &str = "llama-3.1-8b-instant";

/// A completion model that the relay knows how to address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Human-facing name.
    pub display_name: String,

    /// Identifier sent to the provider in the `model` field.
    pub provider_id: String,

    /// Whether the model emits an inline `<think>` block before its answer.
    #[serde(default)]
    pub is_reasoning: bool,
}

impl ModelDescriptor {
    /// Creates a new descriptor.
    pub fn new(
        display_name: impl Into<String>,
        provider_id: impl Into<String>,
        is_reasoning: bool,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            provider_id: provider_id.into(),
            is_reasoning,
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.provider_id.eq_ignore_ascii_case(name) || self.display_name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.provider_id)
    }
}

/// The read-only set of models a process can select from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    /// Creates a registry holding the built-in models.
    pub fn new() -> Self {
        Self {
            models: vec![
                ModelDescriptor::new("Llama 3.1 8B Instant", DEFAULT_MODEL_ID, false),
                ModelDescriptor::new("Llama 3.3 70B Versatile", "llama-3.3-70b-versatile", false),
                ModelDescriptor::new(
                    "DeepSeek R1 Distill Llama 70B",
                    "deepseek-r1-distill-llama-70b",
                    true,
                ),
                ModelDescriptor::new("Qwen QwQ 32B", "qwen-qwq-32b", true),
            ],
        }
    }

    /// Adds models to the registry.  An entry whose provider id is already registered
    /// replaces the existing entry in place.
    pub fn with_models(mut self, models: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        for model in models {
            match self
                .models
                .iter_mut()
                .find(|existing| existing.provider_id == model.provider_id)
            {
                Some(existing) => *existing = model,
                None => self.models.push(model),
            }
        }
        self
    }

    /// Looks a model up by provider id or display name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&ModelDescriptor> {
        let name = name.trim();
        self.models.iter().find(|model| model.matches(name))
    }

    /// All registered models in registration order.
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
