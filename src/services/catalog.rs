//! Static model catalog.
//!
//! The list is hand-maintained and configuration-driven; nothing here talks to
//! the provider.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A selectable remote model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
    "name": "Llama 3.1 8B Instruct Turbo",
    "description": "Fast and efficient Llama 3.1 model"
}))]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ModelDescriptor {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Built-in catalog used when the configuration does not supply one.
pub fn default_descriptors() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::new(
            "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
            "Llama 3.1 8B Instruct Turbo",
            "Fast and efficient Llama 3.1 model",
        ),
        ModelDescriptor::new(
            "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
            "Llama 3.1 70B Instruct Turbo",
            "Powerful Llama 3.1 model",
        ),
        ModelDescriptor::new(
            "meta-llama/Meta-Llama-3.1-405B-Instruct-Turbo",
            "Llama 3.1 405B Instruct Turbo",
            "Most powerful Llama model",
        ),
        ModelDescriptor::new(
            "mistralai/Mixtral-8x7B-Instruct-v0.1",
            "Mixtral 8x7B Instruct",
            "High-quality mixture of experts model",
        ),
        ModelDescriptor::new(
            "mistralai/Mistral-7B-Instruct-v0.2",
            "Mistral 7B Instruct",
            "Efficient 7B parameter model",
        ),
        ModelDescriptor::new(
            "Qwen/Qwen2.5-7B-Instruct-Turbo",
            "Qwen 2.5 7B Instruct Turbo",
            "Fast multilingual model",
        ),
        ModelDescriptor::new(
            "Qwen/Qwen2.5-72B-Instruct-Turbo",
            "Qwen 2.5 72B Instruct Turbo",
            "Powerful multilingual model",
        ),
    ]
}

/// Immutable, ordered set of model descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.iter().any(|m| m.id == id)
    }

    /// Bounded metric label for a requested model: its catalog id, or
    /// [`OTHER_MODEL_LABEL`] for anything the catalog does not list.
    pub fn metric_label(&self, id: &str) -> &str {
        self.models
            .iter()
            .find(|m| m.id == id)
            .map_or(OTHER_MODEL_LABEL, |m| m.id.as_str())
    }
}

/// Label shared by every uncatalogued model.
pub const OTHER_MODEL_LABEL: &str = "other";

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(default_descriptors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalog_contents() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.models().len(), 7);
        assert_eq!(
            catalog.models()[0].id,
            "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo"
        );
        assert_eq!(catalog.models()[6].name, "Qwen 2.5 72B Instruct Turbo");
    }

    #[test]
    fn test_default_catalog_ids_are_unique() {
        let catalog = ModelCatalog::default();
        let ids: HashSet<&str> = catalog.models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.models().len());
    }

    #[test]
    fn test_contains() {
        let catalog = ModelCatalog::default();
        assert!(catalog.contains("mistralai/Mistral-7B-Instruct-v0.2"));
        assert!(!catalog.contains("gpt-4"));
    }

    #[test]
    fn test_metric_label_is_bounded_by_catalog() {
        let catalog = ModelCatalog::default();
        assert_eq!(
            catalog.metric_label("Qwen/Qwen2.5-7B-Instruct-Turbo"),
            "Qwen/Qwen2.5-7B-Instruct-Turbo"
        );
        assert_eq!(catalog.metric_label("gpt-4"), OTHER_MODEL_LABEL);
        assert_eq!(catalog.metric_label(""), OTHER_MODEL_LABEL);
    }

    #[test]
    fn test_descriptor_serialization_field_order() {
        let descriptor = ModelDescriptor::new("a/b", "AB", "desc");
        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(json, r#"{"id":"a/b","name":"AB","description":"desc"}"#);
    }

    #[test]
    fn test_custom_catalog_preserves_order() {
        let catalog = ModelCatalog::new(vec![
            ModelDescriptor::new("z", "Z", "last letter"),
            ModelDescriptor::new("a", "A", "first letter"),
        ]);
        assert_eq!(catalog.models()[0].id, "z");
        assert_eq!(catalog.models()[1].id, "a");
    }
}
