//! Core domain model for rostra.
//!
//! This crate defines the data-product registry, the canonical speech
//! record schema and its normalizer, the in-memory tabular dataset, and
//! the aggregate statistics computed over it. Nothing here talks to a
//! network service.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod stats;

pub use error::{Error, Result};
pub use model::{
    CanonicalRecord, DataProductAvailability, DataProductDefinition, Record, SearchResult, Table,
};
pub use normalize::{normalize, normalize_row, normalize_table, Shape};
pub use registry::ProductRegistry;
