//! Data-product availability resolution.
//!
//! Cross-checks every registry definition against the vector index and
//! the object store. A product is listed iff its collection holds at least
//! one record; object-store presence is recorded but never gates listing.
//!
//! Backend failures never abort resolution. Each check yields a `Result`,
//! and [`BackendCheck::into_availability`] folds failures into the safe
//! default for that signal (count 0, present = false). A failed request
//! affects only its own product; once a backend cannot be connected to at
//! all, its remaining checks are skipped for the rest of the pass.

use std::sync::Arc;

use serde::Serialize;

use rostra_core::{DataProductAvailability, DataProductDefinition, ProductRegistry};

use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::store::{ObjectStore, Snapshot};

/// Products that are currently searchable, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<DataProductAvailability>,
}

impl Catalog {
    pub fn get(&self, key: &str) -> Option<&DataProductAvailability> {
        self.products.iter().find(|p| p.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The default selection: the first available product.
    pub fn first(&self) -> Option<&DataProductAvailability> {
        self.products.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataProductAvailability> {
        self.products.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.key())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a DataProductAvailability;
    type IntoIter = std::slice::Iter<'a, DataProductAvailability>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// Raw per-backend outcomes for one definition.
#[derive(Debug)]
pub struct BackendCheck {
    pub vector_count: Result<u64>,
    pub object_store_present: Result<bool>,
}

impl BackendCheck {
    /// Combine the check outcomes into an availability entry, or `None` if
    /// the product is not materialized in the vector index.
    pub fn into_availability(self, definition: &DataProductDefinition) -> Option<DataProductAvailability> {
        let vector_count = match self.vector_count {
            Ok(count) => count,
            Err(e) => {
                log::warn!(
                    "Vector index check for {} ({}) failed, treating as empty: {}",
                    definition.key,
                    definition.collection,
                    e
                );
                0
            }
        };

        let object_store_present = match self.object_store_present {
            Ok(present) => present,
            Err(e) => {
                log::warn!(
                    "Object store check for {} ({}) failed, treating as absent: {}",
                    definition.key,
                    definition.object_path,
                    e
                );
                false
            }
        };

        (vector_count > 0).then(|| DataProductAvailability {
            definition: definition.clone(),
            vector_count,
            object_store_present,
        })
    }
}

/// Resolves which registered data products are usable right now.
#[derive(Debug, Clone)]
pub struct AvailabilityResolver {
    registry: Arc<ProductRegistry>,
    index: Arc<dyn VectorIndex>,
    store: Arc<dyn ObjectStore>,
    snapshot: Snapshot,
}

impl AvailabilityResolver {
    pub fn new(
        registry: Arc<ProductRegistry>,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn ObjectStore>,
        snapshot: Snapshot,
    ) -> Self {
        Self {
            registry,
            index,
            store,
            snapshot,
        }
    }

    /// Build the catalog of searchable products.
    ///
    /// Recomputed on every call; never fails.
    pub async fn get_available_products(&self) -> Catalog {
        let mut index_up = true;
        let mut store_up = true;
        let mut products = Vec::new();

        for definition in self.registry.iter() {
            let vector_count = if index_up {
                self.vector_count(&definition.collection).await
            } else {
                Err(Error::unavailable("weaviate", "skipped after earlier failure"))
            };
            if vector_count.as_ref().is_err_and(Error::is_unreachable) {
                index_up = false;
            }

            let object_store_present = if store_up {
                self.store
                    .stat(
                        &self.snapshot.repository,
                        &self.snapshot.reference,
                        &definition.object_path,
                    )
                    .await
            } else {
                Err(Error::unavailable("lakefs", "skipped after earlier failure"))
            };
            if object_store_present.as_ref().is_err_and(Error::is_unreachable) {
                store_up = false;
            }

            let check = BackendCheck {
                vector_count,
                object_store_present,
            };
            if let Some(available) = check.into_availability(definition) {
                products.push(available);
            }
        }

        log::debug!(
            "{} of {} data products available",
            products.len(),
            self.registry.len()
        );
        Catalog { products }
    }

    async fn vector_count(&self, collection: &str) -> Result<u64> {
        if !self.index.collection_exists(collection).await? {
            return Ok(0);
        }
        self.index.collection_count(collection).await
    }
}
