//! Integration tests for availability resolution, search, and loading.
//!
//! The three backends are replaced by in-memory fakes that count calls, so
//! these tests verify both results and whether any I/O was attempted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use rostra_core::{DataProductDefinition, ProductRegistry, Record};
use rostra_search::{
    AvailabilityResolver, DatasetLoader, Embedder, Error, Neighbor, ObjectStore, Result,
    SearchExecutor, SearchQuery, Snapshot, VectorIndex,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FakeIndex {
    /// Collection name to (record, distance) pairs.
    collections: HashMap<String, Vec<(Record, f64)>>,
    /// Collections that exist but report a count of zero.
    empty: Vec<String>,
    /// Collections whose requests answer with a server error.
    failing: Vec<String>,
    down: bool,
    calls: AtomicUsize,
}

impl FakeIndex {
    fn with_collection(mut self, name: &str, records: Vec<(Record, f64)>) -> Self {
        self.collections.insert(name.to_string(), records);
        self
    }

    fn with_empty_collection(mut self, name: &str) -> Self {
        self.empty.push(name.to_string());
        self
    }

    fn with_failing_collection(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    fn unreachable() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    fn check(&self, name: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(Error::Unreachable {
                service: "weaviate".into(),
                message: "connection refused".into(),
            });
        }
        if self.failing.iter().any(|f| f == name) {
            return Err(Error::ServiceUnavailable {
                service: "weaviate".into(),
                message: "HTTP status server error (500 Internal Server Error)".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.check(name)?;
        Ok(self.collections.contains_key(name) || self.empty.iter().any(|e| e == name))
    }

    async fn collection_count(&self, name: &str) -> Result<u64> {
        self.check(name)?;
        Ok(self.collections.get(name).map_or(0, |r| r.len() as u64))
    }

    async fn nearest_neighbors(&self, name: &str, _vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check(name)?;
        let records = self
            .collections
            .get(name)
            .ok_or_else(|| Error::CollectionNotFound {
                collection: name.to_string(),
            })?;

        let mut sorted = records.clone();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(sorted
            .into_iter()
            .take(k)
            .map(|(properties, distance)| Neighbor {
                properties,
                distance: Some(distance),
                certainty: Some(1.0 - distance / 2.0),
            })
            .collect())
    }
}

#[derive(Debug, Default)]
struct FakeStore {
    objects: HashMap<String, Bytes>,
    down: bool,
    calls: AtomicUsize,
}

impl FakeStore {
    fn with_object(mut self, path: &str, data: Bytes) -> Self {
        self.objects.insert(path.to_string(), data);
        self
    }

    fn unreachable() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    fn check(&self, repository: &str, reference: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!((repository, reference), ("data", "main"));
        if self.down {
            return Err(Error::Unreachable {
                service: "lakefs".into(),
                message: "timed out".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn stat(&self, repository: &str, reference: &str, path: &str) -> Result<bool> {
        self.check(repository, reference)?;
        Ok(self.objects.contains_key(path))
    }

    async fn get(&self, repository: &str, reference: &str, path: &str) -> Result<Bytes> {
        self.check(repository, reference)?;
        self.objects
            .get(path)
            .cloned()
            .ok_or_else(|| Error::ObjectNotFound {
                path: path.to_string(),
            })
    }
}

#[derive(Debug, Default)]
struct FakeEmbedder {
    down: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(Error::ServiceUnavailable {
                service: "embedding".into(),
                message: "503 Service Unavailable".into(),
            });
        }
        Ok(vec![0.1; 8])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

fn speeches(n: usize) -> Vec<(Record, f64)> {
    (0..n)
        .map(|i| {
            // Alternate between the legacy and the canonical schema.
            let properties = if i % 2 == 0 {
                json!({"title": format!("Speech {i}"), "central_bank": "ECB", "speaker": "Lagarde", "is_governor": true})
            } else {
                json!({"title": format!("Speech {i}"), "country": "Sweden", "author": "Thedéen", "is_gov": 1})
            };
            // Deterministic but unsorted distances in [0, 1).
            let distance = ((i * 37) % n) as f64 / n as f64;
            (record(properties), distance)
        })
        .collect()
}

fn registry() -> Arc<ProductRegistry> {
    Arc::new(
        ProductRegistry::new(vec![
            DataProductDefinition::new("p1", "Product One", "", "ProductOne", "p1.parquet"),
            DataProductDefinition::new("p2", "Product Two", "", "ProductTwo", "p2.parquet"),
            DataProductDefinition::new("p3", "Product Three", "", "ProductThree", "p3.parquet"),
        ])
        .unwrap(),
    )
}

fn resolver(index: Arc<FakeIndex>, store: Arc<FakeStore>) -> AvailabilityResolver {
    AvailabilityResolver::new(registry(), index, store, Snapshot::default())
}

fn executor(embedder: Arc<FakeEmbedder>, index: Arc<FakeIndex>) -> SearchExecutor {
    SearchExecutor::new(registry(), embedder, index)
}

fn parquet_bytes() -> Bytes {
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    let schema = Arc::new(Schema::new(vec![
        Field::new("central_bank", DataType::Utf8, false),
        Field::new("speaker", DataType::Utf8, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("tariff_mention", DataType::Int64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["Fed", "Fed", "ECB"])),
        Arc::new(StringArray::from(vec!["Powell", "Waller", "Lagarde"])),
        Arc::new(StringArray::from(vec!["2024-01-10", "2024-02-01", "2023-11-30"])),
        Arc::new(Int64Array::from(vec![1, 0, 1])),
    ];
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns).unwrap();

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    Bytes::from(buf)
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_catalog_lists_only_products_with_vectors() {
    let index = Arc::new(
        FakeIndex::default()
            .with_collection("ProductOne", speeches(120))
            .with_empty_collection("ProductTwo"),
    );
    let store = Arc::new(
        FakeStore::default()
            .with_object("p1.parquet", Bytes::new())
            .with_object("p2.parquet", Bytes::new()),
    );

    let catalog = resolver(index, store).get_available_products().await;

    assert_eq!(catalog.keys().collect::<Vec<_>>(), ["p1"]);
    let p1 = catalog.get("p1").unwrap();
    assert_eq!(p1.vector_count, 120);
    assert!(p1.object_store_present);
    assert!(!catalog.contains("p2"));
    assert!(!catalog.contains("p3"));
}

#[tokio::test]
async fn test_object_store_presence_does_not_gate() {
    let index = Arc::new(
        FakeIndex::default()
            .with_collection("ProductOne", speeches(3))
            .with_collection("ProductThree", speeches(7)),
    );
    let store = Arc::new(FakeStore::default().with_object("p3.parquet", Bytes::new()));

    let catalog = resolver(index, store).get_available_products().await;

    assert_eq!(catalog.keys().collect::<Vec<_>>(), ["p1", "p3"]);
    assert!(!catalog.get("p1").unwrap().object_store_present);
    assert!(catalog.get("p3").unwrap().object_store_present);
    assert_eq!(catalog.first().unwrap().key(), "p1");
}

#[tokio::test]
async fn test_unreachable_object_store_degrades_flags() {
    let index = Arc::new(
        FakeIndex::default()
            .with_collection("ProductOne", speeches(10))
            .with_collection("ProductTwo", speeches(4)),
    );
    let store = Arc::new(FakeStore::unreachable());

    let catalog = resolver(index, Arc::clone(&store)).get_available_products().await;

    assert_eq!(catalog.len(), 2);
    assert!(catalog.iter().all(|p| !p.object_store_present));
    // The store is not checked again once it has reported itself down.
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_index_yields_empty_catalog() {
    let index = Arc::new(FakeIndex::unreachable());
    let store = Arc::new(FakeStore::default().with_object("p1.parquet", Bytes::new()));

    let catalog = resolver(Arc::clone(&index), store).get_available_products().await;

    assert!(catalog.is_empty());
    assert_eq!(index.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_collection_does_not_hide_others() {
    let index = Arc::new(
        FakeIndex::default()
            .with_collection("ProductOne", speeches(42))
            .with_failing_collection("ProductOne")
            .with_collection("ProductTwo", speeches(42))
            .with_collection("ProductThree", speeches(42)),
    );
    let store = Arc::new(FakeStore::default());

    let catalog = resolver(Arc::clone(&index), store).get_available_products().await;

    assert_eq!(catalog.keys().collect::<Vec<_>>(), ["p2", "p3"]);
    assert!(catalog.iter().all(|p| p.vector_count == 42));
    // One failed check for p1, then exists + count for p2 and p3.
    assert_eq!(index.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_server_error_propagates_from_search() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(
        FakeIndex::default()
            .with_collection("ProductOne", speeches(5))
            .with_failing_collection("ProductOne"),
    );
    let query = SearchQuery::new("rates").unwrap();

    let err = executor(embedder, index)
        .search(&query, "ProductOne", 10)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ServiceUnavailable { .. }));
    assert!(err.is_transient());
    assert!(!err.is_unreachable());
}

#[tokio::test]
async fn test_empty_registry_yields_empty_catalog() {
    let resolver = AvailabilityResolver::new(
        Arc::new(ProductRegistry::default()),
        Arc::new(FakeIndex::default()),
        Arc::new(FakeStore::default()),
        Snapshot::default(),
    );
    assert!(resolver.get_available_products().await.is_empty());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_returns_sorted_normalized_results() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(FakeIndex::default().with_collection("ProductOne", speeches(50)));
    let query = SearchQuery::new("inflation expectations").unwrap();

    let results = executor(embedder, index)
        .search(&query, "ProductOne", 10)
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results.len() <= 10);
    for pair in results.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    for result in &results {
        assert_eq!(result.similarity, 1.0 - result.distance);
        assert!(result.properties.contains_key("country"));
        assert!(result.properties.contains_key("author"));
        assert!(result.properties.contains_key("is_gov"));
        assert!(!result.properties.contains_key("central_bank"));
        assert!(!result.properties.contains_key("speaker"));
        assert!(!result.properties.contains_key("is_governor"));
    }
}

#[tokio::test]
async fn test_similarity_from_distance() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(
        FakeIndex::default().with_collection("ProductOne", vec![(record(json!({"title": "A"})), 0.2)]),
    );
    let query = SearchQuery::new("rates").unwrap();

    let results = executor(embedder, index)
        .search(&query, "ProductOne", 5)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!((results[0].similarity - 0.8).abs() < 1e-12);
    assert_eq!(results[0].distance, 0.2);
}

#[tokio::test]
async fn test_zero_limit_rejected_before_network() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(FakeIndex::default().with_collection("ProductOne", speeches(5)));
    let query = SearchQuery::new("rates").unwrap();

    let err = executor(Arc::clone(&embedder), Arc::clone(&index))
        .search(&query, "ProductOne", 0)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidQuery(_)));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_empty_query_rejected_before_network() {
    assert!(matches!(SearchQuery::new(""), Err(Error::InvalidQuery(_))));
    assert!(matches!(SearchQuery::new("   "), Err(Error::InvalidQuery(_))));
}

#[tokio::test]
async fn test_missing_collection_is_an_error() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(FakeIndex::default());
    let query = SearchQuery::new("rates").unwrap();

    let err = executor(embedder, index)
        .search(&query, "Nowhere", 10)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CollectionNotFound { collection } if collection == "Nowhere"));
}

#[tokio::test]
async fn test_embedding_failure_propagates() {
    let embedder = Arc::new(FakeEmbedder {
        down: true,
        ..FakeEmbedder::default()
    });
    let index = Arc::new(FakeIndex::default().with_collection("ProductOne", speeches(5)));
    let query = SearchQuery::new("rates").unwrap();

    let err = executor(embedder, Arc::clone(&index))
        .search(&query, "ProductOne", 10)
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_index_failure_propagates() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(FakeIndex::unreachable());
    let query = SearchQuery::new("rates").unwrap();

    let result = executor(embedder, index).search(&query, "ProductOne", 10).await;

    assert!(matches!(result, Err(Error::Unreachable { .. })));
}

#[tokio::test]
async fn test_search_product_resolves_collection() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(FakeIndex::default().with_collection("ProductTwo", speeches(4)));
    let query = SearchQuery::new("tariffs").unwrap();

    let results = executor(embedder, index)
        .search_product(&query, "p2", 3)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_search_product_unknown_key() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(FakeIndex::default());
    let query = SearchQuery::new("tariffs").unwrap();

    let err = executor(Arc::clone(&embedder), Arc::clone(&index))
        .search_product(&query, "nope", 3)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownProduct { key } if key == "nope"));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_unknown_product_performs_no_io() {
    let store = Arc::new(FakeStore::default());
    let loader = DatasetLoader::new(registry(), Arc::clone(&store) as _, Snapshot::default());

    let err = loader.load("full_imaginary").await.unwrap_err();

    assert!(matches!(err, Error::UnknownProduct { .. }));
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_load_normalizes_table() {
    let store = Arc::new(FakeStore::default().with_object("p1.parquet", parquet_bytes()));
    let loader = DatasetLoader::new(registry(), store, Snapshot::default());

    let table = loader.load("p1").await.unwrap();

    assert_eq!(table.columns(), ["country", "author", "date", "tariff_mention"]);
    assert_eq!(table.len(), 3);

    let summary = rostra_core::stats::summarize(&table);
    assert_eq!(summary.countries, Some(2));
    assert_eq!(summary.authors, Some(3));
    assert_eq!(summary.tariff_mentions, 2);
}

#[tokio::test]
async fn test_load_missing_object() {
    let store = Arc::new(FakeStore::default());
    let loader = DatasetLoader::new(registry(), store, Snapshot::default());

    let err = loader.load("p2").await.unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound { .. }));
}

#[tokio::test]
async fn test_load_corrupt_object() {
    let store = Arc::new(
        FakeStore::default().with_object("p3.parquet", Bytes::from_static(b"not parquet")),
    );
    let loader = DatasetLoader::new(registry(), store, Snapshot::default());

    let err = loader.load("p3").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_load_store_unreachable() {
    let store = Arc::new(FakeStore::unreachable());
    let loader = DatasetLoader::new(registry(), store, Snapshot::default());

    let err = loader.load("p1").await.unwrap_err();
    assert!(err.is_transient());
}
