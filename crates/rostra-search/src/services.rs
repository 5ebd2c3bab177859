//! Wiring of concrete backend clients into the core components.

use std::sync::Arc;

use rostra_core::ProductRegistry;

use crate::catalog::AvailabilityResolver;
use crate::config::Config;
use crate::embedding::NimEmbedder;
use crate::error::Result;
use crate::executor::SearchExecutor;
use crate::index::WeaviateIndex;
use crate::loader::DatasetLoader;
use crate::store::{LakeFsStore, Snapshot};

/// The registry plus one client per backend, built once from
/// configuration and shared by the components.
#[derive(Debug, Clone)]
pub struct Services {
    pub registry: Arc<ProductRegistry>,
    pub weaviate: Arc<WeaviateIndex>,
    pub embedder: Arc<NimEmbedder>,
    pub lakefs: Arc<LakeFsStore>,
    pub snapshot: Snapshot,
}

impl Services {
    /// Build clients and the registry from configuration.
    ///
    /// No network traffic happens here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = config.registry()?;
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: &Config, registry: ProductRegistry) -> Result<Self> {
        let weaviate = WeaviateIndex::new(config.weaviate_url.as_str())?;
        let embedder = NimEmbedder::new(config.embedding_endpoint.as_str(), config.embedding_model.as_str())?
            .with_dimensions(config.embedding_dimensions);
        let lakefs = LakeFsStore::new(
            &config.lakefs_endpoint,
            config.lakefs_access_key_id.as_str(),
            config.lakefs_secret_access_key.as_str(),
        )?;

        Ok(Self {
            registry: Arc::new(registry),
            weaviate: Arc::new(weaviate),
            embedder: Arc::new(embedder),
            lakefs: Arc::new(lakefs),
            snapshot: config.snapshot(),
        })
    }

    pub fn resolver(&self) -> AvailabilityResolver {
        AvailabilityResolver::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.weaviate) as _,
            Arc::clone(&self.lakefs) as _,
            self.snapshot.clone(),
        )
    }

    pub fn executor(&self) -> SearchExecutor {
        SearchExecutor::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.embedder) as _,
            Arc::clone(&self.weaviate) as _,
        )
    }

    pub fn loader(&self) -> DatasetLoader {
        DatasetLoader::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.lakefs) as _,
            self.snapshot.clone(),
        )
    }
}
