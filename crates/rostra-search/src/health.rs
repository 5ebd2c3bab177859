//! Backend readiness checks for status display.
//!
//! Nothing in the resolver, executor, or loader depends on these.

use std::time::Duration;

use serde::Serialize;

use crate::services::Services;

/// Per-check timeout.
pub const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reachability of each backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub vector_index: bool,
    pub embedding: bool,
    pub object_store: bool,
}

impl ServiceStatus {
    pub fn all_up(&self) -> bool {
        self.vector_index && self.embedding && self.object_store
    }

    pub fn any_up(&self) -> bool {
        self.vector_index || self.embedding || self.object_store
    }

    /// `(name, up)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, bool); 3] {
        [
            ("weaviate", self.vector_index),
            ("nim_embedding", self.embedding),
            ("lakefs", self.object_store),
        ]
    }
}

/// Check all three backends concurrently.
pub async fn check_services(services: &Services) -> ServiceStatus {
    let (vector_index, embedding, object_store) = tokio::join!(
        services.weaviate.ready(READY_TIMEOUT),
        services.embedder.ready(READY_TIMEOUT),
        services.lakefs.ready(READY_TIMEOUT),
    );

    ServiceStatus {
        vector_index,
        embedding,
        object_store,
    }
}
