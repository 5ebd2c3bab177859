//! The data-product registry.
//!
//! The registry is an ordered, immutable table of
//! [`DataProductDefinition`]s built once at start-up and shared by
//! reference with every component that needs it. Order matters: listings
//! follow it, and the first available product is the default selection.
//!
//! A registry can also be read from a TOML file:
//!
//! ```toml
//! [[products]]
//! key = "full_real"
//! label = "Full Real Data"
//! description = "Complete real speeches dataset"
//! collection = "CentralBankSpeeches"
//! object_path = "central-bank-speeches/enriched_speeches.parquet"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::DataProductDefinition;

/// Immutable, ordered set of data-product definitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductRegistry {
    products: Vec<DataProductDefinition>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    products: Vec<DataProductDefinition>,
}

impl ProductRegistry {
    /// Build a registry from definitions, rejecting duplicate keys and
    /// definitions with an empty key, collection, or object path.
    ///
    /// An empty list is valid.
    pub fn new(products: Vec<DataProductDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for product in &products {
            if product.key.trim().is_empty() {
                return Err(Error::InvalidData(
                    "data product with an empty key".to_string(),
                ));
            }
            if product.collection.trim().is_empty() || product.object_path.trim().is_empty() {
                return Err(Error::InvalidData(format!(
                    "data product '{}' must name a collection and an object path",
                    product.key
                )));
            }
            if !seen.insert(product.key.as_str()) {
                return Err(Error::InvalidData(format!(
                    "duplicate data product key '{}'",
                    product.key
                )));
            }
        }
        Ok(Self { products })
    }

    /// The four central bank speech products: full and trial variants of
    /// the real and synthetic corpora.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            products: vec![
                DataProductDefinition::new(
                    "full_real",
                    "Full Real Data",
                    "Complete real speeches dataset",
                    "CentralBankSpeeches",
                    "central-bank-speeches/enriched_speeches.parquet",
                ),
                DataProductDefinition::new(
                    "full_synthetic",
                    "Full Synthetic Data",
                    "Privacy-preserving synthetic speeches",
                    "SyntheticSpeeches",
                    "central-bank-speeches/synthetic/speeches.parquet",
                ),
                DataProductDefinition::new(
                    "trial_real",
                    "Trial Real Data",
                    "Sample of real speeches (10 records)",
                    "CentralBankSpeechesTrial",
                    "central-bank-speeches/trial/enriched_speeches.parquet",
                ),
                DataProductDefinition::new(
                    "trial_synthetic",
                    "Trial Synthetic Data",
                    "Sample of synthetic speeches (10 records)",
                    "SyntheticSpeechesTrial",
                    "central-bank-speeches/synthetic/trial/speeches.parquet",
                ),
            ],
        }
    }

    /// Parse a registry from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content)?;
        Self::new(file.products)
    }

    /// Load a registry from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// definitions it contains are structurally invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let registry = Self::from_toml_str(&content).inspect_err(|e| {
            log::warn!("Invalid product registry {}: {}", path.display(), e);
        })?;
        log::debug!(
            "Loaded {} data products from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn get(&self, key: &str) -> Option<&DataProductDefinition> {
        self.products.iter().find(|p| p.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataProductDefinition> {
        self.products.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> IntoIterator for &'a ProductRegistry {
    type Item = &'a DataProductDefinition;
    type IntoIter = std::slice::Iter<'a, DataProductDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
