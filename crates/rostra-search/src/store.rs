//! Object store access.
//!
//! [`ObjectStore`] is the contract used by the resolver (existence checks)
//! and the loader (whole-object fetch). [`LakeFsStore`] implements it
//! against the lakeFS REST API with basic authentication.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};

use crate::error::{Error, Result};

const SERVICE: &str = "lakefs";

/// A fixed repository and reference that all reads go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub repository: String,
    pub reference: String,
}

impl Snapshot {
    #[must_use]
    pub fn new(repository: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            reference: reference.into(),
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new("data", "main")
    }
}

/// Read-only access to a versioned object store.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Whether an object exists. Never downloads the object.
    async fn stat(&self, repository: &str, reference: &str, path: &str) -> Result<bool>;

    /// Fetch an object's full contents.
    ///
    /// Fails with [`Error::ObjectNotFound`] when the object is absent.
    async fn get(&self, repository: &str, reference: &str, path: &str) -> Result<Bytes>;
}

/// lakeFS API client.
#[derive(Debug, Clone)]
pub struct LakeFsStore {
    http: Client,
    api_base: Url,
    access_key_id: String,
    secret_access_key: String,
}

impl LakeFsStore {
    /// Create a new lakeFS client for `endpoint` (the server root, without
    /// `/api/v1`).
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid base URL or the HTTP
    /// client cannot be created.
    pub fn new(
        endpoint: &str,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self> {
        let mut api_base = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid lakeFS endpoint {endpoint}: {e}")))?;
        api_base
            .path_segments_mut()
            .map_err(|()| Error::Config(format!("lakeFS endpoint {endpoint} cannot be a base")))?
            .pop_if_empty()
            .extend(["api", "v1"]);

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("rostra/0.1.0")
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        })
    }

    /// Readiness check: `GET /api/v1/healthcheck` answers 204 (or 200).
    pub async fn ready(&self, timeout: Duration) -> bool {
        let url = self.url(&["healthcheck"]);
        match self.http.get(url).timeout(timeout).send().await {
            Ok(response) => matches!(
                response.status(),
                StatusCode::OK | StatusCode::NO_CONTENT
            ),
            Err(e) => {
                log::debug!("lakeFS readiness check failed: {}", e);
                false
            }
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn objects_url(&self, repository: &str, reference: &str, stat: bool) -> Url {
        let mut segments = vec!["repositories", repository, "refs", reference, "objects"];
        if stat {
            segments.push("stat");
        }
        self.url(&segments)
    }

    async fn send(&self, url: Url, path: &str) -> Result<reqwest::Response> {
        self.http
            .get(url)
            .query(&[("path", path)])
            .basic_auth(&self.access_key_id, Some(&self.secret_access_key))
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))
    }
}

#[async_trait]
impl ObjectStore for LakeFsStore {
    async fn stat(&self, repository: &str, reference: &str, path: &str) -> Result<bool> {
        let url = self.objects_url(repository, reference, true);
        let response = self.send(url, path).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response
            .error_for_status()
            .map_err(|e| Error::unavailable(SERVICE, e))?;
        Ok(true)
    }

    async fn get(&self, repository: &str, reference: &str, path: &str) -> Result<Bytes> {
        let url = self.objects_url(repository, reference, false);
        let response = self.send(url, path).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::ObjectNotFound {
                path: format!("{repository}/{reference}/{path}"),
            });
        }
        let response = response
            .error_for_status()
            .map_err(|e| Error::unavailable(SERVICE, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::unavailable(SERVICE, e))?;
        log::debug!("Fetched {} bytes from {}", body.len(), path);
        Ok(body)
    }
}
