//! Availability resolution, semantic search, and dataset loading for rostra.
//!
//! Talks to three external services: a Weaviate vector index, a NIM
//! embedding endpoint, and a lakeFS object store. Each is reached through
//! a trait ([`VectorIndex`], [`Embedder`], [`ObjectStore`]) so the
//! components can be exercised against in-memory fakes.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod executor;
pub mod health;
pub mod index;
pub mod loader;
pub mod services;
pub mod store;

pub use catalog::{AvailabilityResolver, BackendCheck, Catalog};
pub use config::Config;
pub use embedding::{Embedder, NimEmbedder};
pub use error::{Error, Result};
pub use executor::{SearchExecutor, SearchQuery};
pub use health::{check_services, ServiceStatus};
pub use index::{Neighbor, VectorIndex, WeaviateIndex};
pub use loader::DatasetLoader;
pub use services::Services;
pub use store::{LakeFsStore, ObjectStore, Snapshot};
