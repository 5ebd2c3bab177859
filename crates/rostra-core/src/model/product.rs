use serde::{Deserialize, Serialize};

/// A static description of one data product.
///
/// Definitions are immutable once the registry is built. The `collection`
/// names the vector-index partition that holds the product's embeddings,
/// and `object_path` locates its dataset inside the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProductDefinition {
    /// Stable registry key (e.g. "full_real").
    pub key: String,

    /// Human-readable label shown in listings.
    pub label: String,

    /// One-line description of the product.
    #[serde(default)]
    pub description: String,

    /// Vector-index collection name.
    pub collection: String,

    /// Path of the dataset object, relative to the repository root.
    pub object_path: String,
}

impl DataProductDefinition {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        collection: impl Into<String>,
        object_path: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
            collection: collection.into(),
            object_path: object_path.into(),
        }
    }
}

/// A data product that is materialized in the vector index.
///
/// Only produced when `vector_count > 0`. `object_store_present` is
/// informational: a product can be searchable without a backing dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProductAvailability {
    #[serde(flatten)]
    pub definition: DataProductDefinition,

    /// Number of records in the product's collection.
    pub vector_count: u64,

    /// Whether the dataset object exists at the configured snapshot.
    pub object_store_present: bool,
}

impl DataProductAvailability {
    pub fn key(&self) -> &str {
        &self.definition.key
    }

    pub fn collection(&self) -> &str {
        &self.definition.collection
    }
}
