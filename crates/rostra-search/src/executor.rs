//! Semantic search over a data product's collection.

use std::fmt;
use std::sync::Arc;

use rostra_core::{normalize_row, ProductRegistry, SearchResult};

use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::index::VectorIndex;

/// A validated, non-blank search query.
///
/// Constructing one is the only way to reach [`SearchExecutor::search`],
/// so blank input is rejected before any backend is contacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Validate `text`, keeping it as given.
    ///
    /// # Errors
    /// Returns [`Error::InvalidQuery`] if `text` is empty after trimming.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidQuery("query text is empty".to_string()));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Embeds queries and runs nearest-neighbour searches.
///
/// Failures always propagate: an empty result set only ever means the
/// collection had no neighbours to return.
#[derive(Debug, Clone)]
pub struct SearchExecutor {
    registry: Arc<ProductRegistry>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl SearchExecutor {
    pub fn new(
        registry: Arc<ProductRegistry>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            registry,
            embedder,
            index,
        }
    }

    /// Search `collection` for the `limit` records nearest to `query`.
    ///
    /// Results are ordered by non-increasing similarity and their
    /// properties are normalized to canonical field names.
    pub async fn search(
        &self,
        query: &SearchQuery,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if limit == 0 {
            return Err(Error::InvalidQuery("limit must be at least 1".to_string()));
        }

        let vector = self.embedder.embed(query.as_str()).await?;
        let neighbors = self
            .index
            .nearest_neighbors(collection, &vector, limit)
            .await?;

        let mut results: Vec<SearchResult> = neighbors
            .into_iter()
            .map(|neighbor| {
                let mut properties = neighbor.properties;
                normalize_row(&mut properties);
                SearchResult::new(properties, neighbor.distance, neighbor.certainty)
            })
            .collect();

        // Stable, so backend order survives among equal scores.
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(limit);

        log::debug!(
            "Search on {} returned {} results (limit {})",
            collection,
            results.len(),
            limit
        );
        Ok(results)
    }

    /// Search the collection behind a registered data product.
    ///
    /// # Errors
    /// Returns [`Error::UnknownProduct`] without contacting any backend if
    /// `product_key` is not registered.
    pub async fn search_product(
        &self,
        query: &SearchQuery,
        product_key: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let definition = self
            .registry
            .get(product_key)
            .ok_or_else(|| Error::UnknownProduct {
                key: product_key.to_string(),
            })?;
        self.search(query, &definition.collection, limit).await
    }
}
