//! Error taxonomy for backend-facing operations.

use thiserror::Error;

/// Errors that can occur while resolving, searching, or loading data
/// products.
#[derive(Debug, Error)]
pub enum Error {
    /// A backend answered with a non-success status or broke off mid-response.
    #[error("{service} unavailable: {message}")]
    ServiceUnavailable { service: String, message: String },

    /// No connection to a backend could be made, or the request timed out.
    #[error("{service} unreachable: {message}")]
    Unreachable { service: String, message: String },

    /// The named collection does not exist in the vector index.
    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    /// The product key is not in the registry.
    #[error("unknown data product: {key}")]
    UnknownProduct { key: String },

    /// A backend answered, but not in the shape its contract promises.
    #[error("malformed response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    /// The dataset object is missing at the configured snapshot.
    #[error("object not found: {path}")]
    ObjectNotFound { path: String },

    /// A search request was rejected before any backend was contacted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An endpoint or client setting is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// An error propagated from the core domain layer.
    #[error(transparent)]
    Core(#[from] rostra_core::Error),
}

impl Error {
    pub(crate) fn unavailable(service: &str, message: impl ToString) -> Self {
        Self::ServiceUnavailable {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    /// Classify a failed send: connect errors and timeouts mean the service
    /// is unreachable as a whole, anything else is a per-request failure.
    pub(crate) fn transport(service: &str, error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::Unreachable {
                service: service.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::unavailable(service, error)
        }
    }

    pub(crate) fn malformed(service: &str, message: impl ToString) -> Self {
        Self::MalformedResponse {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. } | Self::Unreachable { .. })
    }

    /// Returns `true` when the backend as a whole could not be contacted.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// Returns `true` when the error indicates a missing collection, product,
    /// or object.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CollectionNotFound { .. } | Self::UnknownProduct { .. } | Self::ObjectNotFound { .. }
        )
    }
}

/// Convenience alias for search-layer results.
pub type Result<T> = std::result::Result<T, Error>;
