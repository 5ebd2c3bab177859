//! Whole-dataset loading for aggregate statistics.

use std::sync::Arc;

use rostra_core::{normalize_table, ProductRegistry, Table};

use crate::dataset::decode_parquet;
use crate::error::{Error, Result};
use crate::store::{ObjectStore, Snapshot};

/// Loads a product's Parquet dataset from the object store.
///
/// Reads always go through the configured [`Snapshot`]; callers cannot pick
/// another version. The object is held in memory in full, which suits
/// corpora of a few thousand speeches.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    registry: Arc<ProductRegistry>,
    store: Arc<dyn ObjectStore>,
    snapshot: Snapshot,
}

impl DatasetLoader {
    pub fn new(registry: Arc<ProductRegistry>, store: Arc<dyn ObjectStore>, snapshot: Snapshot) -> Self {
        Self {
            registry,
            store,
            snapshot,
        }
    }

    /// Load and normalize the dataset behind `product_key`.
    ///
    /// # Errors
    /// - [`Error::UnknownProduct`] if the key is not registered (no I/O is
    ///   performed)
    /// - [`Error::ObjectNotFound`] if the dataset is missing at the snapshot
    /// - [`Error::MalformedResponse`] if the object is not valid Parquet
    /// - [`Error::ServiceUnavailable`] if the object store cannot be reached
    pub async fn load(&self, product_key: &str) -> Result<Table> {
        let definition = self
            .registry
            .get(product_key)
            .ok_or_else(|| Error::UnknownProduct {
                key: product_key.to_string(),
            })?;

        let data = self
            .store
            .get(
                &self.snapshot.repository,
                &self.snapshot.reference,
                &definition.object_path,
            )
            .await?;

        let mut table = decode_parquet("lakefs", data)?;
        normalize_table(&mut table);

        log::info!(
            "Loaded {} rows for {} from {}@{}",
            table.len(),
            product_key,
            self.snapshot.repository,
            self.snapshot.reference
        );
        Ok(table)
    }
}
