use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use rostra_core::ProductRegistry;

use crate::store::Snapshot;

pub const DEFAULT_WEAVIATE_URL: &str = "http://weaviate.weaviate.svc.cluster.local:80";
pub const DEFAULT_EMBEDDING_ENDPOINT: &str =
    "http://nvidia-nim-embedding.nvidia-nim.svc.cluster.local:8000";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nvidia/llama-3_2-nemoretriever-300m-embed-v2";
pub const DEFAULT_LAKEFS_ENDPOINT: &str = "http://lakefs.lakefs.svc.cluster.local:8000";

/// Configuration for rostra.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (ROSTRA_* prefix)
/// 3. Config file (~/.config/rostra/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Weaviate vector index.
    ///
    /// Can be set via:
    /// - ENV: ROSTRA_WEAVIATE_URL
    /// - Config: weaviate_url = "..."
    pub weaviate_url: String,

    /// Base URL of the NIM embedding service (without `/v1/embeddings`).
    ///
    /// Can be set via:
    /// - ENV: ROSTRA_EMBEDDING_ENDPOINT
    /// - Config: embedding_endpoint = "..."
    pub embedding_endpoint: String,

    /// Embedding model identifier sent with every request.
    pub embedding_model: String,

    /// Expected embedding length. When set, vectors of any other length are
    /// rejected as malformed.
    pub embedding_dimensions: Option<usize>,

    /// Base URL of the lakeFS server (without `/api/v1`).
    ///
    /// Can be set via:
    /// - ENV: ROSTRA_LAKEFS_ENDPOINT
    /// - Config: lakefs_endpoint = "..."
    pub lakefs_endpoint: String,

    /// lakeFS access key id.
    ///
    /// Can be set via:
    /// - ENV: ROSTRA_LAKEFS_ACCESS_KEY_ID
    pub lakefs_access_key_id: String,

    /// lakeFS secret access key.
    ///
    /// Can be set via:
    /// - ENV: ROSTRA_LAKEFS_SECRET_ACCESS_KEY
    pub lakefs_secret_access_key: String,

    /// lakeFS repository holding the datasets.
    pub lakefs_repository: String,

    /// lakeFS branch, tag, or commit that datasets are read from.
    pub lakefs_ref: String,

    /// Optional TOML file replacing the built-in product registry.
    ///
    /// Can be set via:
    /// - CLI: --products /path/to/products.toml
    /// - ENV: ROSTRA_PRODUCTS_PATH
    /// - Config: products_path = "/path/to/products.toml"
    pub products_path: Option<PathBuf>,

    /// Logger settings.
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weaviate_url: DEFAULT_WEAVIATE_URL.to_string(),
            embedding_endpoint: DEFAULT_EMBEDDING_ENDPOINT.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: None,
            lakefs_endpoint: DEFAULT_LAKEFS_ENDPOINT.to_string(),
            lakefs_access_key_id: String::new(),
            lakefs_secret_access_key: String::new(),
            lakefs_repository: "data".to_string(),
            lakefs_ref: "main".to_string(),
            products_path: None,
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/rostra/config.toml
    /// Reads environment variables with ROSTRA_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("rostra");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, overriding the product registry path.
    ///
    /// This is used when the --products CLI flag is provided.
    pub fn load_with_products_path(products_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.products_path = Some(products_path);
        Ok(config)
    }

    /// Build the product registry: the configured file if any, otherwise
    /// the built-in definitions.
    pub fn registry(&self) -> crate::Result<ProductRegistry> {
        match &self.products_path {
            Some(path) => Ok(ProductRegistry::load(path)?),
            None => Ok(ProductRegistry::builtin()),
        }
    }

    /// The object-store snapshot all dataset reads go through.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.lakefs_repository, &self.lakefs_ref)
    }
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/rostra/config.toml
/// - macOS: ~/Library/Application Support/rostra/config.toml
/// - Windows: %APPDATA%\rostra\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rostra")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Rostra Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (ROSTRA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Weaviate vector index holding one collection per data product
#
# Can also be set via:
# - Environment: ROSTRA_WEAVIATE_URL=http://localhost:8080
weaviate_url = "http://weaviate.weaviate.svc.cluster.local:80"

# NIM embedding service used to embed search queries
embedding_endpoint = "http://nvidia-nim-embedding.nvidia-nim.svc.cluster.local:8000"
embedding_model = "nvidia/llama-3_2-nemoretriever-300m-embed-v2"

# Reject embeddings of any other length (optional)
#embedding_dimensions = 1024

# lakeFS object store holding the Parquet datasets
#
# Credentials can also be set via:
# - Environment: ROSTRA_LAKEFS_ACCESS_KEY_ID, ROSTRA_LAKEFS_SECRET_ACCESS_KEY
lakefs_endpoint = "http://lakefs.lakefs.svc.cluster.local:8000"
lakefs_access_key_id = ""
lakefs_secret_access_key = ""
lakefs_repository = "data"
lakefs_ref = "main"

# Replace the built-in data products with a TOML file of [[products]] entries
#
# Can also be set via:
# - CLI: rostra --products /path/to/products.toml products
#products_path = "/path/to/products.toml"

# Logger settings
#[logging]
#coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lakefs_repository, "data");
        assert_eq!(config.lakefs_ref, "main");
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert!(config.products_path.is_none());
        assert!(config.embedding_dimensions.is_none());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_products_path() {
        let custom_path = PathBuf::from("/tmp/products.toml");
        let config = Config::load_with_products_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().products_path, Some(custom_path));
    }

    #[test]
    fn test_default_registry_is_builtin() {
        let registry = Config::default().registry().unwrap();
        assert_eq!(registry, ProductRegistry::builtin());
    }

    #[test]
    fn test_registry_from_products_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("products.toml");
        std::fs::write(
            &path,
            "[[products]]\nkey = \"only\"\nlabel = \"Only\"\ncollection = \"Only\"\nobject_path = \"only.parquet\"\n",
        )
        .unwrap();

        let config = Config {
            products_path: Some(path),
            ..Config::default()
        };
        let registry = config.registry().unwrap();
        assert_eq!(registry.keys().collect::<Vec<_>>(), ["only"]);
    }

    #[test]
    fn test_example_config_parses() {
        let parsed: toml::Value = toml::from_str(example_config()).unwrap();
        assert_eq!(parsed["lakefs_repository"].as_str(), Some("data"));
    }
}
