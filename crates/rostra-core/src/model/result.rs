use serde::{Deserialize, Serialize};

use super::record::{CanonicalRecord, Record};

/// One nearest-neighbour hit.
///
/// `similarity` is always `1 - distance` under the cosine-distance
/// convention (0 = identical). The raw `distance` and `certainty` are kept
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Normalized record properties.
    pub properties: Record,
    pub distance: f64,
    pub certainty: Option<f64>,
    pub similarity: f64,
}

impl SearchResult {
    /// Build a result from raw neighbour data, deriving similarity.
    ///
    /// A missing distance is treated as an exact match.
    #[must_use]
    pub fn new(properties: Record, distance: Option<f64>, certainty: Option<f64>) -> Self {
        let distance = distance.unwrap_or(0.0);
        Self {
            properties,
            distance,
            certainty,
            similarity: 1.0 - distance,
        }
    }

    /// Typed view of the canonical fields.
    pub fn canonical(&self) -> CanonicalRecord {
        CanonicalRecord::from_record(&self.properties)
    }
}
