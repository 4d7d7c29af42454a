//! Model catalog: static metadata for known models.

use serde::{Deserialize, Serialize};

/// Metadata for a single model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelCatalogEntry {
    /// Provider-scoped model identifier (e.g. "llama-3.3-70b-versatile")
    pub id: String,
    /// Human-readable display name
    pub display_name: String,
    /// Whether the model accepts image input parts
    pub supports_images: bool,
    /// Short description
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    models: Vec<ModelCatalogEntry>,
}

/// Return all entries from the bundled static catalog, in declaration order.
/// The first entry is the default model.
pub fn static_catalog() -> Vec<ModelCatalogEntry> {
    let yaml = include_str!("../models.yaml");
    let catalog: CatalogFile =
        serde_yaml::from_str(yaml).expect("bundled models.yaml must be valid");
    catalog.models
}

/// Look up a single model by id.  Returns `None` if not in the catalog.
pub fn lookup(model_id: &str) -> Option<ModelCatalogEntry> {
    static_catalog().into_iter().find(|e| e.id == model_id)
}

/// The default model: the first catalog entry.
pub fn default_model() -> ModelCatalogEntry {
    static_catalog()
        .into_iter()
        .next()
        .expect("bundled catalog must contain at least one model")
}

/// The first catalog entry that accepts images, if any.
/// Auto-switching targets this model when an attachment arrives.
pub fn first_vision_model() -> Option<ModelCatalogEntry> {
    static_catalog().into_iter().find(|e| e.supports_images)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
