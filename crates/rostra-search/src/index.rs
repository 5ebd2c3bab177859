//! Vector index access.
//!
//! [`VectorIndex`] is the contract the resolver and executor depend on.
//! [`WeaviateIndex`] implements it against Weaviate's REST schema endpoint
//! and GraphQL API:
//!
//! - existence: `GET /v1/schema/{class}` (200 exists, 404 absent)
//! - count: `Aggregate { Class { meta { count } } }`
//! - nearest neighbours: `Get { Class(nearVector: ..., limit: k) { ... } }`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use rostra_core::Record;

use crate::error::{Error, Result};

const SERVICE: &str = "weaviate";

/// Scalar Weaviate data types that can be selected in GraphQL without a
/// sub-selection.
const SCALAR_TYPES: &[&str] = &[
    "text", "text[]", "string", "string[]", "int", "int[]", "number", "number[]", "boolean",
    "boolean[]", "date", "date[]", "uuid", "uuid[]",
];

/// A raw neighbour as returned by the index, in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub properties: Record,
    pub distance: Option<f64>,
    pub certainty: Option<f64>,
}

/// Read-only access to a vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync + std::fmt::Debug {
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Total number of records in the collection.
    async fn collection_count(&self, name: &str) -> Result<u64>;

    /// Up to `k` nearest neighbours of `vector`, closest first.
    ///
    /// Fails with [`Error::CollectionNotFound`] if the collection does not
    /// exist.
    async fn nearest_neighbors(&self, name: &str, vector: &[f32], k: usize)
        -> Result<Vec<Neighbor>>;
}

// ---------------------------------------------------------------------------
// Weaviate wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ClassSchema {
    #[serde(default)]
    properties: Vec<PropertySchema>,
}

#[derive(Debug, Deserialize)]
struct PropertySchema {
    name: String,
    #[serde(rename = "dataType", default)]
    data_type: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Weaviate client.
///
/// Wraps a pooled [`reqwest::Client`]; each call checks out a connection
/// and returns it when the response is dropped, on success and error paths
/// alike.
#[derive(Debug, Clone)]
pub struct WeaviateIndex {
    http: Client,
    base_url: String,
}

impl WeaviateIndex {
    /// Create a new Weaviate client for `base_url` (e.g.
    /// `http://localhost:8080`).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("rostra/0.1.0")
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Readiness check: `GET /v1/.well-known/ready` must answer 2xx.
    pub async fn ready(&self, timeout: Duration) -> bool {
        let url = format!("{}/v1/.well-known/ready", self.base_url);
        match self.http.get(&url).timeout(timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::debug!("Weaviate readiness check failed: {}", e);
                false
            }
        }
    }

    /// Fetch the class schema, or `None` if the class does not exist.
    async fn class_schema(&self, name: &str) -> Result<Option<ClassSchema>> {
        if !is_class_name(name) {
            return Ok(None);
        }

        let url = format!("{}/v1/schema/{}", self.base_url, name);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| Error::unavailable(SERVICE, e))?;

        let schema = response
            .json::<ClassSchema>()
            .await
            .map_err(|e| Error::malformed(SERVICE, e))?;
        Ok(Some(schema))
    }

    /// Run a GraphQL query and return its `data` object.
    async fn graphql(&self, query: String) -> Result<Value> {
        let url = format!("{}/v1/graphql", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?
            .error_for_status()
            .map_err(|e| Error::unavailable(SERVICE, e))?;

        let body = response
            .json::<GraphQlResponse>()
            .await
            .map_err(|e| Error::malformed(SERVICE, e))?;

        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(Error::malformed(SERVICE, messages.join("; ")));
        }
        body.data
            .ok_or_else(|| Error::malformed(SERVICE, "GraphQL response without data"))
    }
}

#[async_trait]
impl VectorIndex for WeaviateIndex {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.class_schema(name).await?.is_some())
    }

    async fn collection_count(&self, name: &str) -> Result<u64> {
        if !is_class_name(name) {
            return Err(Error::CollectionNotFound {
                collection: name.to_string(),
            });
        }

        let data = self.graphql(aggregate_query(name)).await?;
        parse_count(&data, name)
    }

    async fn nearest_neighbors(
        &self,
        name: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<Neighbor>> {
        let schema = self
            .class_schema(name)
            .await?
            .ok_or_else(|| Error::CollectionNotFound {
                collection: name.to_string(),
            })?;

        let properties = scalar_properties(&schema);
        let query = near_vector_query(name, &properties, vector, k)?;
        log::debug!(
            "nearVector on {} (k={}, {} properties)",
            name,
            k,
            properties.len()
        );

        let data = self.graphql(query).await?;
        parse_neighbors(&data, name)
    }
}

/// Weaviate class names are GraphQL type names starting with a capital.
fn is_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn scalar_properties(schema: &ClassSchema) -> Vec<&str> {
    schema
        .properties
        .iter()
        .filter(|p| {
            p.data_type
                .first()
                .is_some_and(|t| SCALAR_TYPES.contains(&t.as_str()))
        })
        .map(|p| p.name.as_str())
        .collect()
}

fn aggregate_query(class: &str) -> String {
    format!("{{ Aggregate {{ {class} {{ meta {{ count }} }} }} }}")
}

fn near_vector_query(class: &str, properties: &[&str], vector: &[f32], k: usize) -> Result<String> {
    let vector = serde_json::to_string(vector).map_err(|e| Error::Config(e.to_string()))?;
    Ok(format!(
        "{{ Get {{ {class}(nearVector: {{vector: {vector}}}, limit: {k}) {{ {props} _additional {{ distance certainty }} }} }} }}",
        props = properties.join(" ")
    ))
}

fn parse_count(data: &Value, class: &str) -> Result<u64> {
    let meta = data
        .pointer(&format!("/Aggregate/{class}/0/meta"))
        .ok_or_else(|| Error::malformed(SERVICE, format!("aggregate for {class} missing meta")))?;

    // An empty class can report a null count.
    match meta.get("count") {
        None | Some(Value::Null) => Ok(0),
        Some(count) => count
            .as_u64()
            .ok_or_else(|| Error::malformed(SERVICE, format!("non-integer count {count}"))),
    }
}

fn parse_neighbors(data: &Value, class: &str) -> Result<Vec<Neighbor>> {
    let objects = data
        .pointer(&format!("/Get/{class}"))
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed(SERVICE, format!("Get response for {class} missing")))?;

    objects
        .iter()
        .map(|object| {
            let mut properties = object
                .as_object()
                .cloned()
                .ok_or_else(|| Error::malformed(SERVICE, "neighbour is not an object"))?;
            let additional = properties.remove("_additional").unwrap_or(Value::Null);
            // Unset properties come back as null; treat them as absent.
            properties.retain(|_, value| !value.is_null());

            Ok(Neighbor {
                properties,
                distance: additional.get("distance").and_then(Value::as_f64),
                certainty: additional.get("certainty").and_then(Value::as_f64),
            })
        })
        .collect()
}
